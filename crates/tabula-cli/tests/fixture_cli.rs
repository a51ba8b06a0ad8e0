//! End-to-end runs over a synthesized fixture PDF.

use assert_cmd::Command;
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;

fn tabula() -> Command {
    Command::cargo_bin("tabula").expect("binary built")
}

/// One-page PDF with a stroked 2×2 grid and one Courier letter per cell.
fn grid_fixture() -> tempfile::NamedTempFile {
    let mut content = String::new();
    for dev_y in [692, 672, 652] {
        content.push_str(&format!("100 {dev_y} m 300 {dev_y} l S\n"));
    }
    for x in [100, 200, 300] {
        content.push_str(&format!("{x} 652 m {x} 692 l S\n"));
    }
    for (text, x, dev_y) in [("A", 110, 677), ("B", 210, 677), ("C", 110, 657), ("D", 210, 657)] {
        content.push_str(&format!("BT /F1 10 Tf {x} {dev_y} Td ({text}) Tj ET\n"));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("create temp file");
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize fixture");
    std::fs::write(file.path(), bytes).expect("write fixture");
    file
}

#[test]
fn default_run_emits_csv() {
    let fixture = grid_fixture();
    tabula()
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A,B\nC,D"));
}

#[test]
fn lattice_flag_matches_default_here() {
    let fixture = grid_fixture();
    tabula()
        .args([fixture.path().to_str().unwrap(), "--lattice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A,B"));
}

#[test]
fn json_output_is_parseable() {
    let fixture = grid_fixture();
    let output = tabula()
        .args([fixture.path().to_str().unwrap(), "--format", "json"])
        .output()
        .expect("run binary");
    assert!(output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(parsed[0]["extraction_method"], "lattice");
    assert_eq!(parsed[0]["page_number"], 1);
    assert_eq!(parsed[0]["data"][0][0], "A");
    assert_eq!(parsed[0]["data"][1][1], "D");
}

#[test]
fn markdown_output_renders_pipes() {
    let fixture = grid_fixture();
    tabula()
        .args([fixture.path().to_str().unwrap(), "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| A | B |"));
}

#[test]
fn output_flag_writes_a_file() {
    let fixture = grid_fixture();
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("tables.csv");
    tabula()
        .args([
            fixture.path().to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    let written = std::fs::read_to_string(&out_path).expect("output file");
    assert!(written.contains("A,B"));
}

#[test]
fn out_of_range_page_fails_cleanly() {
    let fixture = grid_fixture();
    tabula()
        .args([fixture.path().to_str().unwrap(), "--pages", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn empty_page_selection_still_succeeds() {
    // Stream extraction of an area with no content yields zero tables,
    // which is success with empty output.
    let fixture = grid_fixture();
    tabula()
        .args([fixture.path().to_str().unwrap(), "--area", "400,400,500,500"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
