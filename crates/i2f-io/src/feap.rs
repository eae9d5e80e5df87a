//! FEAP input deck writer.
//!
//! Serializes a transformed mesh plus configured custom blocks in a fixed
//! section order: header, `coor` block, `elem` block, custom blocks with a
//! negative position, `boun`/`load` blocks generated from node sets, custom
//! blocks with a non-negative position, footer. Within each custom group,
//! blocks are ordered by ascending position with declaration order breaking
//! ties.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use i2f_model::{Element, Mesh, Node};

/// A literal block of FEAP input inserted at a configured position.
///
/// Negative positions place the block before the node-set `boun`/`load`
/// blocks, non-negative positions after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomBlock {
    /// FEAP command opening the block (e.g. `vbou`, `link`, `eloa`)
    pub keyword: String,
    /// Ordering key, see above
    pub position: i32,
    /// Literal card lines written below the keyword
    pub cards: Vec<String>,
}

/// Writer for a transformed mesh.
pub struct FeapWriter<'a> {
    mesh: &'a Mesh,
    header: Option<&'a str>,
    footer: Option<&'a str>,
    custom_blocks: &'a [CustomBlock],
}

impl<'a> FeapWriter<'a> {
    /// Create a writer for the given mesh
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            header: None,
            footer: None,
            custom_blocks: &[],
        }
    }

    /// Text written verbatim before the coordinate block
    pub fn with_header(mut self, text: &'a str) -> Self {
        self.header = Some(text);
        self
    }

    /// Text written verbatim after everything else
    pub fn with_footer(mut self, text: &'a str) -> Self {
        self.footer = Some(text);
        self
    }

    /// Custom blocks to splice in, in declaration order
    pub fn with_custom_blocks(mut self, blocks: &'a [CustomBlock]) -> Self {
        self.custom_blocks = blocks;
        self
    }

    /// Write the deck, creating or overwriting the file at `path`
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }

    /// Write the deck to any sink
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(header) = self.header {
            writeln!(out, "{header}")?;
        }

        writeln!(out, "coor")?;
        for node in &self.mesh.nodes {
            out.write_all(node_line(node).as_bytes())?;
        }

        writeln!(out)?;
        writeln!(out, "elem")?;
        for element in &self.mesh.elements {
            out.write_all(element_line(element).as_bytes())?;
        }

        let mut ordered: Vec<&CustomBlock> = self.custom_blocks.iter().collect();
        ordered.sort_by_key(|block| block.position);

        for block in ordered.iter().filter(|b| b.position < 0) {
            write_custom_block(out, block)?;
        }
        self.write_set_cards(out)?;
        for block in ordered.iter().filter(|b| b.position >= 0) {
            write_custom_block(out, block)?;
        }

        if let Some(footer) = self.footer {
            write!(out, "\n{footer}")?;
        }
        Ok(())
    }

    /// Emit one `boun` and/or `load` block per node set carrying card text,
    /// one line per node in ascending node-id order.
    fn write_set_cards<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for set in &self.mesh.node_sets {
            let mut ids = set.nodes.clone();
            ids.sort_unstable();

            if let Some(card) = set.boundary_card.as_deref()
                && !card.is_empty()
            {
                writeln!(out)?;
                writeln!(out, "boun ** NSET={}", set.name)?;
                for id in &ids {
                    writeln!(out, "{id}, 0, {card}")?;
                }
            }
            if let Some(card) = set.load_card.as_deref()
                && !card.is_empty()
            {
                writeln!(out)?;
                writeln!(out, "load ** NSET={}", set.name)?;
                for id in &ids {
                    writeln!(out, "{id}, 0, {card}")?;
                }
            }
        }
        Ok(())
    }
}

fn write_custom_block<W: Write>(out: &mut W, block: &CustomBlock) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", block.keyword)?;
    for card in &block.cards {
        writeln!(out, "{card}")?;
    }
    Ok(())
}

/// One `coor` line: id, the constant generation flag 0, then the
/// coordinates at fixed precision.
fn node_line(node: &Node) -> String {
    match node.z {
        Some(z) => format!(
            "{:8}, 0, {:14.8}, {:14.8}, {:14.8}\n",
            node.id, node.x, node.y, z
        ),
        None => format!("{:8}, 0, {:14.8}, {:14.8}\n", node.id, node.x, node.y),
    }
}

/// One `elem` line: id, material number, then the node references.
fn element_line(element: &Element) -> String {
    let mut line = format!("{:8}, {}", element.id, element.material);
    for node in &element.nodes {
        line.push_str(&format!(", {node}"));
    }
    line.push('\n');
    line
}
