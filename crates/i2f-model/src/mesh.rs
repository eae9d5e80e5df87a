//! Mesh data structures: nodes, elements, and the mesh that owns them.

use crate::sets::{ElementSet, NodeSet};

/// A node in the finite element mesh: an id plus 2-D or 3-D coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node ID (1-based indexing from the input file)
    pub id: i32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate; `None` for a 2-D node
    pub z: Option<f64>,
}

impl Node {
    /// Create a 2-D node
    pub fn new_2d(id: i32, x: f64, y: f64) -> Self {
        Self { id, x, y, z: None }
    }

    /// Create a 3-D node
    pub fn new_3d(id: i32, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z: Some(z) }
    }

    /// Spatial dimensionality of this node (2 or 3)
    pub fn ndim(&self) -> usize {
        if self.z.is_some() { 3 } else { 2 }
    }

    /// Coordinates as an array, z taken as 0 for 2-D nodes
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z.unwrap_or(0.0)]
    }

    /// Translate the node; dz is ignored for 2-D nodes
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        if let Some(z) = &mut self.z {
            *z += dz;
        }
    }
}

/// An element in the finite element mesh.
///
/// All elements of a model share one node count; the reader tracks it on
/// [`Mesh::nodes_per_element`]. The material tag selects the FEAP material
/// the element is assigned to, and `duplicate_materials` lists the extra
/// material tags the element will be cloned for by the duplication pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element ID (unique within a model)
    pub id: i32,
    /// Node connectivity (node IDs, order significant)
    pub nodes: Vec<i32>,
    /// Material number (FEAP `matn`), defaults to 1
    pub material: i32,
    /// Material numbers this element will be duplicated for
    pub duplicate_materials: Vec<i32>,
}

impl Element {
    /// Create a new element with the default material tag
    pub fn new(id: i32, nodes: Vec<i32>) -> Self {
        Self {
            id,
            nodes,
            material: 1,
            duplicate_materials: Vec::new(),
        }
    }
}

/// Complete mesh gathered from one Abaqus `.inp` file.
///
/// Node and element collections preserve input order. Sets are looked up by
/// name through ordered iteration, never a hash map: the first declaration
/// wins on lookup, matching the declaration-order semantics of the source
/// format.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// All nodes, in input order
    pub nodes: Vec<Node>,
    /// All elements, in input order
    pub elements: Vec<Element>,
    /// Named node sets, in declaration order
    pub node_sets: Vec<NodeSet>,
    /// Named element sets, in declaration order
    pub element_sets: Vec<ElementSet>,
    /// Running model dimensionality. Defaults to 3; the reader adopts the
    /// newest node's dimensionality on mismatch (last write wins).
    pub ndim: usize,
    /// Model-wide nodes per element, once known
    pub nodes_per_element: Option<usize>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            elements: Vec::new(),
            node_sets: Vec::new(),
            element_sets: Vec::new(),
            ndim: 3,
            nodes_per_element: None,
        }
    }

    /// Largest element id in the mesh, 0 when empty
    pub fn max_element_id(&self) -> i32 {
        self.elements.iter().map(|e| e.id).max().unwrap_or(0)
    }

    /// First node set with the given name, in declaration order
    pub fn node_set(&self, name: &str) -> Option<&NodeSet> {
        self.node_sets.iter().find(|s| s.name == name)
    }

    /// First element set with the given name, in declaration order
    pub fn element_set(&self, name: &str) -> Option<&ElementSet> {
        self.element_sets.iter().find(|s| s.name == name)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
