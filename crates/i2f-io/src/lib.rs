//! File I/O for the inp2feap conversion pipeline.
//!
//! This crate provides:
//! - the **Abaqus `.inp` mesh reader** for nodes, elements, and named
//!   node/element sets
//! - the **FEAP deck writer** (`coor`/`elem` blocks, `boun`/`load` cards
//!   generated from node sets, custom input blocks)
//! - the **JSON configuration** loader with up-front schema validation
//! - the end-to-end [`convert`] pipeline tying them together

pub mod config;
pub mod convert;
mod error;
pub mod feap;
pub mod inp;

pub use config::{Config, LoadedConfig, SchemaWarning};
pub use convert::{ConvertSummary, convert};
pub use error::{ConvertError, Result};
pub use feap::{CustomBlock, FeapWriter};
pub use inp::InpParser;
