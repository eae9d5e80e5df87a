//! Abaqus `.inp` mesh reader.
//!
//! A one-pass, mode-switching scanner: a line starting with `*` selects the
//! section being read, every other line is data for the current section.
//! Recognized markers are `*Node`, `*Element`, `*Nset, nset=NAME` and
//! `*Elset, elset=NAME[, generate]`; anything else switches to an ignore
//! mode whose lines are counted and reported at the end.
//!
//! Element records come in two shapes. Without a pre-declared node count,
//! each data line is one element and the first element fixes the model-wide
//! count. With a pre-declared count, data lines are a flat integer stream
//! and elements are reassembled from it, so one record may span several
//! physical lines or several records may share one.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};

use i2f_model::{Element, ElementSet, Mesh, Node, NodeSet};

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    Nodes,
    Elements,
    NodeSet,
    ElementSet,
    Unknown,
}

/// Parser for the node/element/set subset of the Abaqus `.inp` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct InpParser {
    nodes_per_element: Option<usize>,
}

impl InpParser {
    /// Parser that detects the node count from the first element record
    pub fn new() -> Self {
        Self {
            nodes_per_element: None,
        }
    }

    /// Parser with a pre-declared node count; element records are
    /// reassembled from a flat integer stream
    pub fn with_nodes_per_element(count: usize) -> Self {
        Self {
            nodes_per_element: Some(count),
        }
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Mesh> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConvertError::FileNotFound(path.display().to_string()),
            _ => ConvertError::Io(err),
        })?;
        info!("parsing input file '{}'", path.display());
        self.parse_str(&raw)
    }

    pub fn parse_str(&self, raw: &str) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        mesh.nodes_per_element = self.nodes_per_element;

        let mut mode = ReadMode::Nodes;
        // Integer values accumulated while reassembling pre-declared-width
        // element records that span physical lines.
        let mut pending = Vec::<i32>::new();
        let mut ignored = Vec::<usize>::new();

        for (index, line) in raw.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();

            if trimmed.starts_with('*') {
                mode = switch_mode(trimmed, &mut mesh, &pending);
                if mode == ReadMode::Elements {
                    pending.clear();
                }
                continue;
            }
            if trimmed.is_empty() {
                continue;
            }

            match mode {
                ReadMode::Nodes => {
                    let node = parse_node_record(trimmed, line_no)?;
                    if node.ndim() != mesh.ndim {
                        warn!(
                            "node {} spatial dimension {} doesn't match previous dimension {}",
                            node.id,
                            node.ndim(),
                            mesh.ndim
                        );
                        mesh.ndim = node.ndim();
                    }
                    mesh.nodes.push(node);
                }
                ReadMode::Elements => match self.nodes_per_element {
                    None => {
                        let element = parse_element_record(trimmed, line_no)?;
                        match mesh.nodes_per_element {
                            None => {
                                info!("assuming {} nodes per element", element.nodes.len());
                                mesh.nodes_per_element = Some(element.nodes.len());
                            }
                            Some(count) if count != element.nodes.len() => {
                                warn!(
                                    "element {} has {} nodes, doesn't match previous count {}",
                                    element.id,
                                    element.nodes.len(),
                                    count
                                );
                                mesh.nodes_per_element = Some(element.nodes.len());
                            }
                            Some(_) => {}
                        }
                        mesh.elements.push(element);
                    }
                    Some(count) => {
                        for field in trimmed.split(',') {
                            let field = field.trim();
                            if field.is_empty() {
                                continue;
                            }
                            pending.push(parse_int(field, line_no)?);
                        }
                        // First value of each record is the element id.
                        let record_len = 1 + count;
                        while pending.len() >= record_len {
                            let values: Vec<i32> = pending.drain(..record_len).collect();
                            mesh.elements.push(Element::new(values[0], values[1..].to_vec()));
                        }
                    }
                },
                ReadMode::NodeSet => {
                    // The open set is the one most recently appended.
                    if let Some(set) = mesh.node_sets.last_mut() {
                        for field in trimmed.split(',') {
                            let field = field.trim();
                            if field.is_empty() {
                                continue;
                            }
                            set.nodes.push(parse_int(field, line_no)?);
                        }
                    }
                }
                ReadMode::ElementSet => {
                    if let Some(set) = mesh.element_sets.last_mut() {
                        if set.generate {
                            let references = expand_generate_range(trimmed, line_no)?;
                            set.elements.extend(references);
                        } else {
                            for field in trimmed.split(',') {
                                let field = field.trim();
                                if field.is_empty() {
                                    continue;
                                }
                                set.elements.push(parse_int(field, line_no)?);
                            }
                        }
                    }
                }
                ReadMode::Unknown => ignored.push(line_no),
            }
        }

        info!(
            "parsed {} nodes (ndim={}) and {} elements (nodes per element={})",
            mesh.nodes.len(),
            mesh.ndim,
            mesh.elements.len(),
            mesh.nodes_per_element
                .map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );
        if !mesh.node_sets.is_empty() || !mesh.element_sets.is_empty() {
            info!(
                "parsed {} node sets and {} element sets",
                mesh.node_sets.len(),
                mesh.element_sets.len()
            );
        }
        if !ignored.is_empty() {
            info!(
                "ignored lines with unrecognized input: {}",
                ignored
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(mesh)
    }
}

/// Select the new read mode from a section marker line, opening a named set
/// when the marker declares one.
fn switch_mode(marker: &str, mesh: &mut Mesh, pending: &[i32]) -> ReadMode {
    let keyword = marker.split(',').next().unwrap_or("").trim();
    match keyword {
        "*Node" => ReadMode::Nodes,
        "*Element" => ReadMode::Elements,
        "*Nset" => {
            let name =
                marker_value(marker, "nset").unwrap_or_else(|| "UNKNOWN_NSET".to_string());
            mesh.node_sets.push(NodeSet::new(name));
            ReadMode::NodeSet
        }
        "*Elset" => {
            let name =
                marker_value(marker, "elset").unwrap_or_else(|| "UNKNOWN_ELSET".to_string());
            let mut set = ElementSet::new(name);
            set.generate = marker.split(',').any(|field| field.trim() == "generate");
            mesh.element_sets.push(set);
            ReadMode::ElementSet
        }
        _ => {
            if !pending.is_empty() {
                warn!(
                    "{} unprocessed element input entries remain at '{}'",
                    pending.len(),
                    keyword
                );
            }
            ReadMode::Unknown
        }
    }
}

/// `key=value` lookup among the comma-separated fields of a marker line.
fn marker_value(marker: &str, key: &str) -> Option<String> {
    marker.split(',').find_map(|field| {
        let (k, v) = field.split_once('=')?;
        (k.trim() == key).then(|| v.trim().to_string())
    })
}

fn parse_node_record(line: &str, line_no: usize) -> Result<Node> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let node = match fields.len() {
        3 => Node::new_2d(
            parse_int(fields[0], line_no)?,
            parse_float(fields[1], line_no)?,
            parse_float(fields[2], line_no)?,
        ),
        4 => Node::new_3d(
            parse_int(fields[0], line_no)?,
            parse_float(fields[1], line_no)?,
            parse_float(fields[2], line_no)?,
            parse_float(fields[3], line_no)?,
        ),
        count => {
            return Err(ConvertError::Format {
                line: line_no,
                message: format!("node record expects 3 or 4 values (id, x, y[, z]), got {count}"),
            });
        }
    };
    if node.id < 1 {
        return Err(ConvertError::Format {
            line: line_no,
            message: format!("node id must be positive, got {}", node.id),
        });
    }
    Ok(node)
}

fn parse_element_record(line: &str, line_no: usize) -> Result<Element> {
    let mut fields = line.split(',').map(str::trim);
    let id = parse_int(fields.next().unwrap_or(""), line_no)?;
    let nodes = fields
        .filter(|f| !f.is_empty())
        .map(|f| parse_int(f, line_no))
        .collect::<Result<Vec<i32>>>()?;
    if nodes.is_empty() {
        return Err(ConvertError::Format {
            line: line_no,
            message: "element record needs at least one node reference".to_string(),
        });
    }
    Ok(Element::new(id, nodes))
}

/// Expand a `(start, end, increment)` line of a generated element set into
/// the referenced ids, end inclusive.
fn expand_generate_range(line: &str, line_no: usize) -> Result<Vec<i32>> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(ConvertError::Format {
            line: line_no,
            message: format!(
                "generated element set expects 3 values (start, end, increment), got {}",
                fields.len()
            ),
        });
    }
    let start = parse_int(fields[0], line_no)?;
    let end = parse_int(fields[1], line_no)?;
    let increment = parse_int(fields[2], line_no)?;
    if increment < 1 {
        return Err(ConvertError::Format {
            line: line_no,
            message: format!("generate increment must be positive, got {increment}"),
        });
    }

    let mut references = Vec::new();
    let mut current = start;
    while current <= end {
        references.push(current);
        current += increment;
    }
    Ok(references)
}

fn parse_int(token: &str, line_no: usize) -> Result<i32> {
    token.parse().map_err(|_| ConvertError::Format {
        line: line_no,
        message: format!("invalid integer '{token}'"),
    })
}

fn parse_float(token: &str, line_no: usize) -> Result<f64> {
    token.parse().map_err(|_| ConvertError::Format {
        line: line_no,
        message: format!("invalid number '{token}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_elements_and_sets() {
        let src = "\
*Node
1, 0.0, 0.0, 0.0
2, 1.0, 0.0, 0.0
3, 1.0, 1.0, 0.0
4, 0.0, 1.0, 0.0
*Element, type=S4R
1, 1, 2, 3, 4
*Nset, nset=EDGE
1, 2
*Elset, elset=SHELLS
1
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.nodes.len(), 4);
        assert_eq!(mesh.elements.len(), 1);
        assert_eq!(mesh.nodes_per_element, Some(4));
        assert_eq!(mesh.ndim, 3);
        assert_eq!(mesh.node_set("EDGE").unwrap().nodes, vec![1, 2]);
        assert_eq!(mesh.element_set("SHELLS").unwrap().elements, vec![1]);
    }

    #[test]
    fn unnamed_sets_get_default_names() {
        let src = "\
*Nset
1
*Elset
2
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.node_sets[0].name, "UNKNOWN_NSET");
        assert_eq!(mesh.element_sets[0].name, "UNKNOWN_ELSET");
    }

    #[test]
    fn empty_bodied_set_is_still_recorded() {
        let src = "\
*Nset, nset=EMPTY
*Node
1, 0.0, 0.0, 0.0
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.node_sets.len(), 1);
        assert!(mesh.node_set("EMPTY").unwrap().nodes.is_empty());
    }

    #[test]
    fn generated_set_expands_inclusive_range() {
        let src = "\
*Elset, elset=ODDS, generate
1, 10, 2
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.element_set("ODDS").unwrap().elements, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn generated_set_rejects_wrong_arity() {
        let src = "\
*Elset, elset=BAD, generate
1, 10
";
        let err = InpParser::new().parse_str(src).expect_err("should fail");
        match err {
            ConvertError::Format { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("3 values"), "unexpected message: {message}");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn predeclared_count_reassembles_records_across_lines() {
        let src = "\
*Node
1, 0.0, 0.0, 0.0
*Element, type=C3D8
1, 1, 2, 3, 4,
5, 6, 7, 8
2, 9, 10, 11, 12, 13, 14, 15, 16
";
        let mesh = InpParser::with_nodes_per_element(8)
            .parse_str(src)
            .expect("parse should succeed");
        assert_eq!(mesh.elements.len(), 2);
        assert_eq!(mesh.elements[0].id, 1);
        assert_eq!(mesh.elements[0].nodes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(mesh.elements[1].id, 2);
        assert_eq!(mesh.elements[1].nodes, vec![9, 10, 11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn node_count_mismatch_adopts_newest_value() {
        let src = "\
*Element
1, 1, 2, 3, 4
2, 5, 6, 7
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.elements.len(), 2);
        assert_eq!(mesh.nodes_per_element, Some(3));
    }

    #[test]
    fn dimension_mismatch_adopts_newest_value() {
        let src = "\
*Node
1, 0.0, 0.0
2, 1.0, 0.0
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.ndim, 2);
        assert_eq!(mesh.nodes[0].ndim(), 2);
    }

    #[test]
    fn malformed_coordinate_fails_with_line_number() {
        let src = "\
*Node
1, 0.0, abc, 0.0
";
        let err = InpParser::new().parse_str(src).expect_err("should fail");
        match err {
            ConvertError::Format { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"), "unexpected message: {message}");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn node_record_rejects_negative_id() {
        let err = parse_node_record("-22, 0.7070, 1.4142, -0.5", 3).expect_err("should fail");
        match err {
            ConvertError::Format { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("positive"), "unexpected message: {message}");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn node_record_rejects_wrong_arity() {
        let err = parse_node_record("1, 2.0", 7).expect_err("should fail");
        match err {
            ConvertError::Format { line, .. } => assert_eq!(line, 7),
            other => panic!("expected format error, got {other:?}"),
        }
        assert!(parse_node_record("1, 2.0, 3.0, 4.0, 5.0", 1).is_err());
    }

    #[test]
    fn unrecognized_sections_are_ignored() {
        let src = "\
*Heading
job-1
*Node
1, 0.0, 0.0, 0.0
*Material, name=STEEL
210000.0, 0.3
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.nodes.len(), 1);
        assert!(mesh.elements.is_empty());
    }

    #[test]
    fn element_trailing_comma_is_tolerated() {
        let src = "\
*Element
1, 1, 2, 3,
";
        let mesh = InpParser::new().parse_str(src).expect("parse should succeed");
        assert_eq!(mesh.elements[0].nodes, vec![1, 2, 3]);
        assert_eq!(mesh.nodes_per_element, Some(3));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let err = InpParser::new()
            .parse_file("/nonexistent/mesh.inp")
            .expect_err("should fail");
        assert!(matches!(err, ConvertError::FileNotFound(_)));
    }
}
