//! End-to-end conversion: configuration → mesh → transformed FEAP deck.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use i2f_model::transform;

use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::feap::FeapWriter;
use crate::inp::InpParser;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub nodes: usize,
    pub elements: usize,
    pub node_sets: usize,
    pub element_sets: usize,
    pub output: PathBuf,
}

/// Run one conversion: parse the mesh, apply the configured edits, write
/// the deck. Fatal errors abort before the output file is created.
pub fn convert(config: &Config) -> Result<ConvertSummary> {
    let parser = match config.nodes_per_element {
        Some(count) => InpParser::with_nodes_per_element(count),
        None => InpParser::new(),
    };
    let mut mesh = parser.parse_file(&config.input)?;

    let header = read_optional_text(config.header.as_deref())?;
    let footer = read_optional_text(config.footer.as_deref())?;

    transform::apply(&mut mesh, &config.elsets, &config.nsets, config.center_mesh);

    let mut writer = FeapWriter::new(&mesh).with_custom_blocks(&config.custom_inputs);
    if let Some(text) = header.as_deref() {
        writer = writer.with_header(text);
    }
    if let Some(text) = footer.as_deref() {
        writer = writer.with_footer(text);
    }
    writer.write_file(&config.output)?;
    info!("file {} written", config.output.display());

    Ok(ConvertSummary {
        nodes: mesh.nodes.len(),
        elements: mesh.elements.len(),
        node_sets: mesh.node_sets.len(),
        element_sets: mesh.element_sets.len(),
        output: config.output.clone(),
    })
}

fn read_optional_text(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        None => Ok(None),
        Some(path) => fs::read_to_string(path).map(Some).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConvertError::FileNotFound(path.display().to_string()),
            _ => ConvertError::Io(err),
        }),
    }
}
