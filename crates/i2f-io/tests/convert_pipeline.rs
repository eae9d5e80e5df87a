//! Integration tests driving the full configuration → mesh → deck pipeline.

use std::fs;
use std::path::PathBuf;

use i2f_io::convert::convert;
use i2f_io::{ConvertError, config};
use tempfile::TempDir;

const PLATE_INP: &str = "\
*Node
1, 0.0, 0.0, 0.0
2, 10.0, 0.0, 0.0
3, 10.0, 10.0, 0.0
4, 0.0, 10.0, 0.0
*Element, type=S4R
1, 1, 2, 3, 4
*Nset, nset=SUPPORTS
1, 2
*Elset, elset=STEEL
1
";

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should write");
    path
}

#[test]
fn converts_a_configured_model_end_to_end() {
    let dir = TempDir::new().expect("temp dir");
    write_fixture(&dir, "model.inp", PLATE_INP);
    write_fixture(&dir, "head.txt", "feap ** plate\n");
    write_fixture(&dir, "foot.txt", "end\n");
    let out_path = dir.path().join("ifeap");
    let config_json = format!(
        r#"{{
            "input": "model.inp",
            "output": "{out}",
            "header": "head.txt",
            "footer": "foot.txt",
            "elsets": [{{"name": "STEEL", "materialNumber": 3}}],
            "nsets": [{{"name": "SUPPORTS", "boundaryCard": "1, 1, 1"}}],
            "customInput": [
                {{"block": "vbou", "position": -1, "cards": ["1, 0, 0, 0, 1"]}},
                {{"block": "link", "position": 1, "cards": ["2, 3"]}}
            ]
        }}"#,
        out = out_path.display()
    );
    let config_path = write_fixture(&dir, "run.json", &config_json);

    let loaded = config::load(&config_path).expect("config should load");
    assert!(loaded.warnings.is_empty(), "warnings: {:?}", loaded.warnings);
    let summary = convert(&loaded.config).expect("conversion should succeed");
    assert_eq!(summary.nodes, 4);
    assert_eq!(summary.elements, 1);
    assert_eq!(summary.output, out_path);

    let deck = fs::read_to_string(&out_path).expect("deck should exist");
    assert!(deck.starts_with("feap ** plate\n\ncoor\n"), "deck was: {deck}");
    assert!(deck.contains("       2, 0,    10.00000000,     0.00000000,     0.00000000\n"));
    assert!(deck.contains("\nelem\n       1, 3, 1, 2, 3, 4\n"));
    assert!(deck.contains("boun ** NSET=SUPPORTS\n1, 0, 1, 1, 1\n2, 0, 1, 1, 1\n"));
    assert!(deck.ends_with("\nend\n"));

    let vbou_at = deck.find("\nvbou\n").expect("vbou block missing");
    let boun_at = deck.find("boun ** NSET=SUPPORTS").expect("boun block missing");
    let link_at = deck.find("\nlink\n").expect("link block missing");
    assert!(vbou_at < boun_at && boun_at < link_at);
}

#[test]
fn centering_translates_the_written_coordinates() {
    let dir = TempDir::new().expect("temp dir");
    write_fixture(
        &dir,
        "tri.inp",
        "\
*Node
1, 0.0, 0.0, 0.0
2, 10.0, 0.0, 0.0
3, 0.0, 10.0, 0.0
",
    );
    let out_path = dir.path().join("ifeap");
    let config_json = format!(
        r#"{{"input": "tri.inp", "output": "{out}", "centerMesh": true}}"#,
        out = out_path.display()
    );
    let config_path = write_fixture(&dir, "run.json", &config_json);

    let loaded = config::load(&config_path).expect("config should load");
    convert(&loaded.config).expect("conversion should succeed");

    let deck = fs::read_to_string(&out_path).expect("deck should exist");
    assert!(deck.contains("       1, 0,    -5.00000000,    -5.00000000,     0.00000000\n"));
    assert!(deck.contains("       2, 0,     5.00000000,    -5.00000000,     0.00000000\n"));
    assert!(deck.contains("       3, 0,    -5.00000000,     5.00000000,     0.00000000\n"));
}

#[test]
fn duplicated_elements_appear_in_the_deck() {
    let dir = TempDir::new().expect("temp dir");
    write_fixture(&dir, "model.inp", PLATE_INP);
    let out_path = dir.path().join("ifeap");
    let config_json = format!(
        r#"{{
            "input": "model.inp",
            "output": "{out}",
            "elsets": [{{"name": "STEEL", "materialNumber": 2, "duplicateMaterials": [5]}}]
        }}"#,
        out = out_path.display()
    );
    let config_path = write_fixture(&dir, "run.json", &config_json);

    let loaded = config::load(&config_path).expect("config should load");
    let summary = convert(&loaded.config).expect("conversion should succeed");
    assert_eq!(summary.elements, 2);

    let deck = fs::read_to_string(&out_path).expect("deck should exist");
    assert!(deck.contains("       1, 2, 1, 2, 3, 4\n"));
    assert!(deck.contains("       2, 5, 1, 2, 3, 4\n"));
}

#[test]
fn missing_mesh_file_aborts_before_writing() {
    let dir = TempDir::new().expect("temp dir");
    let out_path = dir.path().join("ifeap");
    let config_json = format!(
        r#"{{"input": "absent.inp", "output": "{out}"}}"#,
        out = out_path.display()
    );
    let config_path = write_fixture(&dir, "run.json", &config_json);

    let loaded = config::load(&config_path).expect("config should load");
    let err = convert(&loaded.config).expect_err("conversion should fail");
    assert!(matches!(err, ConvertError::FileNotFound(_)));
    assert!(!out_path.exists());
}
