pub mod node_classification;

pub use node_classification::{DisplayColor, NodeClassification};
