//! Configuration-driven mesh transformations.
//!
//! Four ordered passes over a parsed mesh, plus optional centering:
//! 1. copy configured material numbers and duplicate lists onto element sets
//! 2. propagate set materials onto member elements
//! 3. clone elements carrying duplicate materials
//! 4. copy configured boundary/load cards onto node sets
//!
//! The order matters: duplication examines only elements present before the
//! pass, so set binding and propagation must run first. All "not found"
//! conditions are non-fatal and reported through the log.

use log::{info, warn};

use crate::mesh::{Element, Mesh};

/// Configured edit for one element set: material assignment and duplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ElsetEdit {
    /// Name of the element set to edit (exact match)
    pub name: String,
    /// Material number assigned to member elements
    pub material_number: i32,
    /// Extra material numbers member elements are duplicated for
    pub duplicate_materials: Vec<i32>,
}

/// Configured edit for one node set: boundary and load card text.
#[derive(Debug, Clone, PartialEq)]
pub struct NsetEdit {
    /// Name of the node set to edit (exact match)
    pub name: String,
    /// `boun` card text appended per node
    pub boundary_card: Option<String>,
    /// `load` card text appended per node
    pub load_card: Option<String>,
}

/// Run all transformation passes in order.
pub fn apply(mesh: &mut Mesh, elset_edits: &[ElsetEdit], nset_edits: &[NsetEdit], center: bool) {
    bind_element_sets(mesh, elset_edits);
    propagate_materials(mesh);
    duplicate_elements(mesh);
    bind_node_sets(mesh, nset_edits);
    if center {
        center_mesh(mesh);
    }
}

/// Copy configured material numbers and duplicate lists onto the matching
/// element sets. The first set with a matching name, in declaration order,
/// receives the edit; an absent name is reported and skipped.
pub fn bind_element_sets(mesh: &mut Mesh, edits: &[ElsetEdit]) {
    for edit in edits {
        match mesh.element_sets.iter_mut().find(|s| s.name == edit.name) {
            Some(set) => {
                set.material_number = edit.material_number;
                info!(
                    "setting material number {} for all elements in elset {}",
                    set.material_number, set.name
                );
                if !edit.duplicate_materials.is_empty() {
                    set.duplicate_materials = edit.duplicate_materials.clone();
                    info!(
                        "elset {} will be duplicated (materials {:?})",
                        set.name, set.duplicate_materials
                    );
                }
            }
            None => warn!("couldn't find elset '{}' in mesh", edit.name),
        }
    }
}

/// Set each element's material from the sets that contain it. An element
/// belonging to several sets takes the values of the last containing set in
/// declaration order.
pub fn propagate_materials(mesh: &mut Mesh) {
    let Mesh {
        elements,
        element_sets,
        ..
    } = mesh;
    for element in elements.iter_mut() {
        for set in element_sets.iter() {
            if set.elements.contains(&element.id) {
                element.material = set.material_number;
                if !set.duplicate_materials.is_empty() {
                    element.duplicate_materials = set.duplicate_materials.clone();
                }
            }
        }
    }
}

/// Clone every element carrying duplicate materials, one clone per entry.
///
/// Fresh ids are assigned sequentially starting just above the maximum
/// element id of the original mesh, independent of iteration order. Clones
/// are appended after the pass, so clones are never themselves examined.
pub fn duplicate_elements(mesh: &mut Mesh) {
    let base = mesh.max_element_id();
    let mut created = Vec::new();
    for element in &mesh.elements {
        for &material in &element.duplicate_materials {
            let id = base + created.len() as i32 + 1;
            let mut clone = Element::new(id, element.nodes.clone());
            clone.material = material;
            created.push(clone);
        }
    }
    if !created.is_empty() {
        info!(
            "duplicated elements: {} new elements with ids {}..={}",
            created.len(),
            base + 1,
            base + created.len() as i32
        );
    }
    mesh.elements.extend(created);
}

/// Copy configured boundary/load cards onto the matching node sets. Same
/// first-match and not-found semantics as [`bind_element_sets`].
pub fn bind_node_sets(mesh: &mut Mesh, edits: &[NsetEdit]) {
    for edit in edits {
        match mesh.node_sets.iter_mut().find(|s| s.name == edit.name) {
            Some(set) => {
                set.boundary_card = edit.boundary_card.clone();
                set.load_card = edit.load_card.clone();
                if let Some(card) = set.boundary_card.as_deref()
                    && !card.is_empty()
                {
                    info!("adding 'boun' card '{}' for all nodes in nset {}", card, set.name);
                }
                if let Some(card) = set.load_card.as_deref()
                    && !card.is_empty()
                {
                    info!("adding 'load' card '{}' for all nodes in nset {}", card, set.name);
                }
            }
            None => warn!("couldn't find nset '{}' in mesh", edit.name),
        }
    }
}

/// Translate all nodes so the axis-aligned bounding box is centered at the
/// origin. The z coordinate of 2-D nodes counts as 0 for the box and stays
/// untouched by the translation. A mesh that is already centered (all
/// deltas exactly zero) is left alone.
pub fn center_mesh(mesh: &mut Mesh) {
    if mesh.nodes.is_empty() {
        return;
    }

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for node in &mesh.nodes {
        let coords = node.coords();
        for axis in 0..3 {
            min[axis] = min[axis].min(coords[axis]);
            max[axis] = max[axis].max(coords[axis]);
        }
    }

    let shift = [
        -min[0] - (max[0] - min[0]) / 2.0,
        -min[1] - (max[1] - min[1]) / 2.0,
        -min[2] - (max[2] - min[2]) / 2.0,
    ];
    if shift == [0.0, 0.0, 0.0] {
        return;
    }

    info!(
        "translating mesh from bounding box [{:.2},{:.2}]x[{:.2},{:.2}]x[{:.2},{:.2}] by ({:.2}, {:.2}, {:.2})",
        min[0], max[0], min[1], max[1], min[2], max[2], shift[0], shift[1], shift[2]
    );
    for node in &mut mesh.nodes {
        node.translate(shift[0], shift[1], shift[2]);
    }
}
