//! In-memory mesh model for the inp2feap conversion pipeline.
//!
//! This crate provides:
//! - **Mesh data structures**: nodes, elements, and named node/element sets
//!   as read from an Abaqus `.inp` file
//! - **Transformations**: material assignment through element sets, element
//!   duplication for layered materials, boundary/load card binding through
//!   node sets, and bounding-box centering
//!
//! The model is built once by the reader, mutated in place by
//! [`transform::apply`], and then serialized by the deck writer.

pub mod mesh;
pub mod sets;
pub mod transform;

pub use mesh::{Element, Mesh, Node};
pub use sets::{ElementSet, NodeSet};
pub use transform::{ElsetEdit, NsetEdit};
