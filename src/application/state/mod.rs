//! Session state held across job searches

pub mod tree_state_cache;

pub use tree_state_cache::TreeStateCache;
