pub mod tree_resolver;

pub use tree_resolver::TreeResolver;
