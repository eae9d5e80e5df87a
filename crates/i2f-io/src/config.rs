//! JSON configuration loading and schema validation.
//!
//! The configuration document is checked against an explicit schema up
//! front: unknown keys and tolerated type mismatches are collected as
//! [`SchemaWarning`]s while the run continues with best-effort coerced
//! values; missing required keys and malformed documents abort.
//!
//! `input`, `header` and `footer` paths are resolved relative to the
//! directory containing the configuration file; `output` is used as given.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use i2f_model::{ElsetEdit, NsetEdit};

use crate::error::{ConvertError, Result};
use crate::feap::CustomBlock;

const KNOWN_KEYS: [&str; 9] = [
    "input",
    "output",
    "nodesPerElement",
    "header",
    "footer",
    "centerMesh",
    "elsets",
    "nsets",
    "customInput",
];
const REQUIRED_KEYS: [&str; 2] = ["input", "output"];
const ELSET_KEYS: [&str; 3] = ["name", "materialNumber", "duplicateMaterials"];
const NSET_KEYS: [&str; 3] = ["name", "boundaryCard", "loadCard"];
const CUSTOM_KEYS: [&str; 3] = ["block", "position", "cards"];

/// A non-fatal schema finding: an unknown key or a tolerated type mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// Dotted path of the offending key
    pub context: String,
    pub message: String,
}

impl SchemaWarning {
    fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config key '{}': {}", self.context, self.message)
    }
}

/// Validated configuration for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Abaqus `.inp` file to read the mesh from
    pub input: PathBuf,
    /// FEAP deck to write
    pub output: PathBuf,
    /// Pre-declared nodes per element; detected from the first element
    /// record when absent
    pub nodes_per_element: Option<usize>,
    /// Text file spliced in before the coordinate block
    pub header: Option<PathBuf>,
    /// Text file appended after all mesh data
    pub footer: Option<PathBuf>,
    /// Translate the mesh so its bounding box is centered at the origin
    pub center_mesh: bool,
    pub elsets: Vec<ElsetEdit>,
    pub nsets: Vec<NsetEdit>,
    pub custom_inputs: Vec<CustomBlock>,
}

/// A configuration plus the schema warnings its validation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<SchemaWarning>,
}

/// Load and validate a configuration file.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConvertError::FileNotFound(path.display().to_string()),
        _ => ConvertError::Io(err),
    })?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse(&raw, &base_dir)
}

/// Validate a configuration document against the schema.
pub fn parse(raw: &str, base_dir: &Path) -> Result<LoadedConfig> {
    let document: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = document else {
        return Err(ConvertError::Config(
            "configuration document must be a JSON object".to_string(),
        ));
    };

    let mut warnings = Vec::new();
    for key in map.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warnings.push(SchemaWarning::new(key.clone(), "unknown key, ignored"));
        }
    }
    for key in REQUIRED_KEYS {
        if !map.contains_key(key) {
            return Err(ConvertError::Config(format!("required key '{key}' missing")));
        }
    }

    let input = base_dir.join(coerce_string(&map["input"], "input", &mut warnings));
    let output = PathBuf::from(coerce_string(&map["output"], "output", &mut warnings));

    let mut nodes_per_element = None;
    if let Some(value) = map.get("nodesPerElement") {
        match coerce_int(value, "nodesPerElement", &mut warnings) {
            Some(count) if count >= 1 => nodes_per_element = Some(count as usize),
            Some(count) => warnings.push(SchemaWarning::new(
                "nodesPerElement",
                format!("must be a positive integer, ignoring {count}"),
            )),
            None => {}
        }
    }

    let header = map
        .get("header")
        .map(|value| base_dir.join(coerce_string(value, "header", &mut warnings)));
    let footer = map
        .get("footer")
        .map(|value| base_dir.join(coerce_string(value, "footer", &mut warnings)));
    let center_mesh = map
        .get("centerMesh")
        .map(|value| coerce_bool(value, "centerMesh", &mut warnings))
        .unwrap_or(false);

    let elsets = match map.get("elsets") {
        Some(value) => parse_elsets(value, &mut warnings)?,
        None => Vec::new(),
    };
    let nsets = match map.get("nsets") {
        Some(value) => parse_nsets(value, &mut warnings)?,
        None => Vec::new(),
    };
    let custom_inputs = match map.get("customInput") {
        Some(value) => parse_custom_inputs(value, &mut warnings)?,
        None => Vec::new(),
    };

    Ok(LoadedConfig {
        config: Config {
            input,
            output,
            nodes_per_element,
            header,
            footer,
            center_mesh,
            elsets,
            nsets,
            custom_inputs,
        },
        warnings,
    })
}

fn entries<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(ConvertError::Config(format!(
            "'{context}' must be a list of objects"
        ))),
    }
}

fn fields<'a>(
    entry: &'a Value,
    context: &str,
) -> Result<&'a serde_json::Map<String, Value>> {
    match entry {
        Value::Object(fields) => Ok(fields),
        _ => Err(ConvertError::Config(format!("{context} must be an object"))),
    }
}

fn required<'a>(
    fields: &'a serde_json::Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<&'a Value> {
    fields.get(key).ok_or_else(|| {
        ConvertError::Config(format!("required key '{key}' missing in {context}"))
    })
}

fn warn_unknown_keys(
    fields: &serde_json::Map<String, Value>,
    known: &[&str],
    context: &str,
    warnings: &mut Vec<SchemaWarning>,
) {
    for key in fields.keys() {
        if !known.contains(&key.as_str()) {
            warnings.push(SchemaWarning::new(
                format!("{context}.{key}"),
                "unknown key, ignored",
            ));
        }
    }
}

fn parse_elsets(value: &Value, warnings: &mut Vec<SchemaWarning>) -> Result<Vec<ElsetEdit>> {
    let mut edits = Vec::new();
    for (index, entry) in entries(value, "elsets")?.iter().enumerate() {
        let context = format!("elsets[{index}]");
        let fields = fields(entry, &context)?;
        warn_unknown_keys(fields, &ELSET_KEYS, &context, warnings);

        let name = coerce_string(
            required(fields, "name", &context)?,
            &format!("{context}.name"),
            warnings,
        );
        let material_number = fields
            .get("materialNumber")
            .and_then(|v| coerce_int(v, &format!("{context}.materialNumber"), warnings))
            .unwrap_or(1) as i32;
        let duplicate_materials = fields
            .get("duplicateMaterials")
            .map(|v| coerce_int_list(v, &format!("{context}.duplicateMaterials"), warnings))
            .unwrap_or_default()
            .into_iter()
            .map(|n| n as i32)
            .collect();

        edits.push(ElsetEdit {
            name,
            material_number,
            duplicate_materials,
        });
    }
    Ok(edits)
}

fn parse_nsets(value: &Value, warnings: &mut Vec<SchemaWarning>) -> Result<Vec<NsetEdit>> {
    let mut edits = Vec::new();
    for (index, entry) in entries(value, "nsets")?.iter().enumerate() {
        let context = format!("nsets[{index}]");
        let fields = fields(entry, &context)?;
        warn_unknown_keys(fields, &NSET_KEYS, &context, warnings);

        let name = coerce_string(
            required(fields, "name", &context)?,
            &format!("{context}.name"),
            warnings,
        );
        let boundary_card = fields
            .get("boundaryCard")
            .map(|v| coerce_string(v, &format!("{context}.boundaryCard"), warnings));
        let load_card = fields
            .get("loadCard")
            .map(|v| coerce_string(v, &format!("{context}.loadCard"), warnings));

        edits.push(NsetEdit {
            name,
            boundary_card,
            load_card,
        });
    }
    Ok(edits)
}

fn parse_custom_inputs(
    value: &Value,
    warnings: &mut Vec<SchemaWarning>,
) -> Result<Vec<CustomBlock>> {
    let mut blocks = Vec::new();
    for (index, entry) in entries(value, "customInput")?.iter().enumerate() {
        let context = format!("customInput[{index}]");
        let fields = fields(entry, &context)?;
        warn_unknown_keys(fields, &CUSTOM_KEYS, &context, warnings);

        let keyword = coerce_string(
            required(fields, "block", &context)?,
            &format!("{context}.block"),
            warnings,
        );
        let position = coerce_int(
            required(fields, "position", &context)?,
            &format!("{context}.position"),
            warnings,
        )
        .ok_or_else(|| {
            ConvertError::Config(format!("'{context}.position' must be an integer"))
        })? as i32;
        let cards = coerce_string_list(
            required(fields, "cards", &context)?,
            &format!("{context}.cards"),
            warnings,
        );

        blocks.push(CustomBlock {
            keyword,
            position,
            cards,
        });
    }
    Ok(blocks)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn coerce_string(value: &Value, context: &str, warnings: &mut Vec<SchemaWarning>) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => {
            warnings.push(SchemaWarning::new(
                context,
                format!("expected a string, got {}; using its text form", kind(other)),
            ));
            match other {
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                other => other.to_string(),
            }
        }
    }
}

fn coerce_int(value: &Value, context: &str, warnings: &mut Vec<SchemaWarning>) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Some(int)
            } else {
                warnings.push(SchemaWarning::new(
                    context,
                    format!("expected an integer, got {number}; rounding"),
                ));
                number.as_f64().map(|float| float.round() as i64)
            }
        }
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(int) => {
                warnings.push(SchemaWarning::new(
                    context,
                    format!("expected an integer, got the string '{text}'; parsed it"),
                ));
                Some(int)
            }
            Err(_) => {
                warnings.push(SchemaWarning::new(
                    context,
                    format!("expected an integer, got the unparseable string '{text}'"),
                ));
                None
            }
        },
        other => {
            warnings.push(SchemaWarning::new(
                context,
                format!("expected an integer, got {}", kind(other)),
            ));
            None
        }
    }
}

fn coerce_bool(value: &Value, context: &str, warnings: &mut Vec<SchemaWarning>) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => {
            warnings.push(SchemaWarning::new(
                context,
                "expected a boolean, got a number; treating non-zero as true",
            ));
            number.as_f64().is_some_and(|float| float != 0.0)
        }
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => {
                warnings.push(SchemaWarning::new(
                    context,
                    format!("expected a boolean, got the string '{text}'; treating as true"),
                ));
                true
            }
            _ => {
                warnings.push(SchemaWarning::new(
                    context,
                    format!("expected a boolean, got the string '{text}'; treating as false"),
                ));
                false
            }
        },
        other => {
            warnings.push(SchemaWarning::new(
                context,
                format!("expected a boolean, got {}; treating as false", kind(other)),
            ));
            false
        }
    }
}

fn coerce_int_list(value: &Value, context: &str, warnings: &mut Vec<SchemaWarning>) -> Vec<i64> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                coerce_int(item, &format!("{context}[{index}]"), warnings)
            })
            .collect(),
        other => {
            warnings.push(SchemaWarning::new(
                context,
                format!("expected a list, got {}; wrapping the single value", kind(other)),
            ));
            coerce_int(other, context, warnings).into_iter().collect()
        }
    }
}

fn coerce_string_list(
    value: &Value,
    context: &str,
    warnings: &mut Vec<SchemaWarning>,
) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| coerce_string(item, &format!("{context}[{index}]"), warnings))
            .collect(),
        other => {
            warnings.push(SchemaWarning::new(
                context,
                format!("expected a list, got {}; wrapping the single value", kind(other)),
            ));
            vec![coerce_string(other, context, warnings)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(raw: &str) -> LoadedConfig {
        parse(raw, Path::new("/work")).expect("config should parse")
    }

    #[test]
    fn parses_complete_document() {
        let loaded = parse_ok(
            r#"{
                "input": "model.inp",
                "output": "ifeap",
                "nodesPerElement": 4,
                "header": "head.txt",
                "footer": "foot.txt",
                "centerMesh": true,
                "elsets": [
                    {"name": "STEEL", "materialNumber": 3, "duplicateMaterials": [5, 7]}
                ],
                "nsets": [
                    {"name": "SUPPORTS", "boundaryCard": "1, 1, 1", "loadCard": "0, 0, -1"}
                ],
                "customInput": [
                    {"block": "vbou", "position": -1, "cards": ["1, 0, 0, 0, 1"]}
                ]
            }"#,
        );

        assert!(loaded.warnings.is_empty(), "warnings: {:?}", loaded.warnings);
        let config = loaded.config;
        assert_eq!(config.input, PathBuf::from("/work/model.inp"));
        assert_eq!(config.output, PathBuf::from("ifeap"));
        assert_eq!(config.nodes_per_element, Some(4));
        assert_eq!(config.header, Some(PathBuf::from("/work/head.txt")));
        assert!(config.center_mesh);
        assert_eq!(config.elsets.len(), 1);
        assert_eq!(config.elsets[0].material_number, 3);
        assert_eq!(config.elsets[0].duplicate_materials, vec![5, 7]);
        assert_eq!(
            config.nsets[0].boundary_card.as_deref(),
            Some("1, 1, 1")
        );
        assert_eq!(config.custom_inputs[0].keyword, "vbou");
        assert_eq!(config.custom_inputs[0].position, -1);
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let err = parse(r#"{"input": "model.inp"}"#, Path::new("."))
            .expect_err("should fail");
        match err {
            ConvertError::Config(message) => assert!(message.contains("output")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_warns_and_is_ignored() {
        let loaded = parse_ok(r#"{"input": "a", "output": "b", "scaleMesh": 2.0}"#);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].context, "scaleMesh");
    }

    #[test]
    fn type_mismatch_warns_and_coerces() {
        let loaded =
            parse_ok(r#"{"input": "a", "output": "b", "nodesPerElement": "8", "centerMesh": 1}"#);
        assert_eq!(loaded.config.nodes_per_element, Some(8));
        assert!(loaded.config.center_mesh);
        assert_eq!(loaded.warnings.len(), 2);
    }

    #[test]
    fn scalar_duplicate_material_is_wrapped() {
        let loaded = parse_ok(
            r#"{"input": "a", "output": "b", "elsets": [{"name": "X", "duplicateMaterials": 4}]}"#,
        );
        assert_eq!(loaded.config.elsets[0].duplicate_materials, vec![4]);
        assert!(!loaded.warnings.is_empty());
    }

    #[test]
    fn elset_without_name_is_fatal() {
        let err = parse(
            r#"{"input": "a", "output": "b", "elsets": [{"materialNumber": 2}]}"#,
            Path::new("."),
        )
        .expect_err("should fail");
        match err {
            ConvertError::Config(message) => assert!(message.contains("name")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn custom_input_requires_block_position_and_cards() {
        let err = parse(
            r#"{"input": "a", "output": "b", "customInput": [{"block": "vbou"}]}"#,
            Path::new("."),
        )
        .expect_err("should fail");
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = parse("{not json", Path::new(".")).expect_err("should fail");
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn negative_nodes_per_element_is_dropped_with_warning() {
        let loaded = parse_ok(r#"{"input": "a", "output": "b", "nodesPerElement": -2}"#);
        assert_eq!(loaded.config.nodes_per_element, None);
        assert_eq!(loaded.warnings.len(), 1);
    }
}
