pub mod forest;
pub mod node_type;
pub mod part;
pub mod resolution;
pub mod sub_id;
pub mod work_order_key;
pub mod work_order_node;

pub use forest::{Forest, ForestEntry};
pub use node_type::{ChildState, NodeType};
pub use part::{Part, Requirement};
pub use resolution::{Anomaly, Resolution, ResolvedNode, UnresolvedRow};
pub use sub_id::SubId;
pub use work_order_key::{JobNumber, WorkOrderKey};
pub use work_order_node::{LegacyRow, Quantities, WorkOrderNode};
