//! Named node and element sets for grouped operations.

/// A named collection of node ids.
///
/// The boundary and load cards are free FEAP card text attached per node of
/// the set by the deck writer; they are populated from the configuration,
/// never from the `.inp` file itself. Node references are not checked
/// against the declared nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSet {
    /// Set name
    pub name: String,
    /// Node IDs in the set
    pub nodes: Vec<i32>,
    /// `boun` card text appended per node, if configured
    pub boundary_card: Option<String>,
    /// `load` card text appended per node, if configured
    pub load_card: Option<String>,
}

impl NodeSet {
    /// Create an empty node set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            boundary_card: None,
            load_card: None,
        }
    }
}

/// A named collection of element ids.
///
/// `generate` marks a set whose body is a `(start, end, increment)` range
/// instead of an explicit id list. The material number and duplicate list
/// are populated from the configuration and pushed onto member elements by
/// the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSet {
    /// Set name
    pub name: String,
    /// Element IDs in the set
    pub elements: Vec<i32>,
    /// Whether the set body is a generated range
    pub generate: bool,
    /// Material number assigned to member elements, defaults to 1
    pub material_number: i32,
    /// Material numbers member elements are duplicated for
    pub duplicate_materials: Vec<i32>,
}

impl ElementSet {
    /// Create an empty element set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            generate: false,
            material_number: 1,
            duplicate_materials: Vec::new(),
        }
    }
}
