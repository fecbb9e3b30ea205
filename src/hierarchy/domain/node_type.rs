use serde::Serialize;

/// Display category of a tree node, derived from part flags and structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Assembly,
    Manufactured,
    Purchased,
    Unknown,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Assembly => "ASSEMBLY",
            NodeType::Manufactured => "MANUFACTURED",
            NodeType::Purchased => "PURCHASED",
            NodeType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Child list of a node in the arena
///
/// `NoChildren`, `NotLoaded` and `Failed` are distinct states and must never
/// be conflated; `Loaded(vec![])` means a fetch returned nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildState {
    NoChildren,
    NotLoaded,
    Loading,
    Loaded(Vec<super::WorkOrderKey>),
    Failed(String),
}

impl ChildState {
    /// Structural answer used for classification
    ///
    /// An unloaded or failed pointer still promises a subtree.
    pub fn has_children(&self) -> bool {
        match self {
            ChildState::NoChildren => false,
            ChildState::NotLoaded | ChildState::Loading | ChildState::Failed(_) => true,
            ChildState::Loaded(children) => !children.is_empty(),
        }
    }

    pub fn loaded_children(&self) -> &[super::WorkOrderKey] {
        match self {
            ChildState::Loaded(children) => children,
            _ => &[],
        }
    }

    /// Whether `expand` has to go to the gateway for this node
    pub fn needs_fetch(&self) -> bool {
        matches!(self, ChildState::NotLoaded | ChildState::Failed(_))
    }
}
