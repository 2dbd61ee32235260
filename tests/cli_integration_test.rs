//! CLI integration tests.
//!
//! Runs the actual binary against generated PDFs and detector responses.

use assert_cmd::Command;
use predicates::prelude::*;
use redactor_engine::DrawInstruction;
use std::fs;
use tempfile::TempDir;

mod common;
use common::*;

/// Creates a test Command for the engine binary.
fn engine_cmd() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("redactor-engine")
}

const DETECTIONS: &str = r#"[
    {"page": 0, "bbox": {"x": 72, "y": 700, "width": 90, "height": 14}, "text": "John Doe", "category": "Names"},
    {"page": 0, "bbox": {"x": 72, "y": 680, "width": 60, "height": 14}, "text": "555-0100", "category": "Phones"},
    {"page": 0, "bbox": {"x": 72, "y": 660, "width": 90, "height": 14}, "text": "John Doe", "category": "Names"}
]"#;

mod argument_parsing {
    use super::*;

    #[test]
    fn test_help_lists_subcommands() {
        engine_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("pages"))
            .stdout(predicate::str::contains("transform"))
            .stdout(predicate::str::contains("project"));
    }

    #[test]
    fn test_version_flag() {
        engine_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("redactor-engine"))
            .stdout(predicate::str::contains("0.3.0"));
    }

    #[test]
    fn test_malformed_size_rejected() {
        engine_cmd()
            .args(["transform", "--document", "612", "--render", "600x776", "--bbox", "1,2,3,4"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("WIDTHxHEIGHT"));
    }
}

mod transform {
    use super::*;

    #[test]
    fn test_render_to_document() {
        engine_cmd()
            .args([
                "transform",
                "--document",
                "612x792",
                "--render",
                "306x396",
                "--bbox",
                "50,20,40,6",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("100.0000,740.0000,80.0000,12.0000"));
    }

    #[test]
    fn test_document_to_render() {
        engine_cmd()
            .args([
                "transform",
                "--document",
                "612x792",
                "--render",
                "306x396",
                "--bbox",
                "10,700,40,12",
                "--to",
                "render",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("5.0000,40.0000,20.0000,6.0000"));
    }
}

mod pages {
    use super::*;

    #[test]
    fn test_lists_page_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let input = TestPdfBuilder::new()
            .with_page(297.0, 210.0)
            .build(&temp_dir.path().join("in.pdf"))
            .unwrap();

        engine_cmd()
            .arg("pages")
            .arg("--input")
            .arg(&input)
            .assert()
            .success()
            .stdout(predicate::str::contains("page 0:"))
            .stdout(predicate::str::contains("page 1:"));
    }

    #[test]
    fn test_missing_input_file() {
        engine_cmd()
            .args(["pages", "--input", "/nonexistent/in.pdf"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn test_not_a_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.pdf");
        fs::write(&input, "plain text").unwrap();

        engine_cmd()
            .arg("pages")
            .arg("--input")
            .arg(&input)
            .assert()
            .failure()
            .stderr(predicate::str::contains("malformed document"));
    }
}

mod project {
    use super::*;

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let input = TestPdfBuilder::new()
            .build(&temp_dir.path().join("in.pdf"))
            .unwrap();
        let detections = temp_dir.path().join("detections.json");
        fs::write(&detections, DETECTIONS).unwrap();
        (temp_dir, input, detections)
    }

    #[test]
    fn test_projects_all_detections() {
        let (temp_dir, input, detections) = setup();
        let output = temp_dir.path().join("rects.json");

        engine_cmd()
            .arg("project")
            .arg("--input")
            .arg(&input)
            .arg("--detections")
            .arg(&detections)
            .arg("--render-width")
            .arg("600")
            .arg("--output")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::contains("Projected 3 of 3 entities"));

        let rects: Vec<DrawInstruction> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(rects.len(), 3);
        assert_bbox_approx(rects[0].bbox, redactor_engine::BBox::new(72.0, 700.0, 90.0, 14.0), 1e-9);
    }

    #[test]
    fn test_hidden_category_and_text_are_not_exported() {
        let (_temp_dir, input, detections) = setup();

        let assert = engine_cmd()
            .arg("project")
            .arg("--input")
            .arg(&input)
            .arg("--detections")
            .arg(&detections)
            .arg("--hide-category")
            .arg("Phones")
            .assert()
            .success();
        let rects: Vec<DrawInstruction> =
            serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert_eq!(rects.len(), 2);

        let assert = engine_cmd()
            .arg("project")
            .arg("--input")
            .arg(&input)
            .arg("--detections")
            .arg(&detections)
            .arg("--hide-text")
            .arg("John Doe")
            .assert()
            .success();
        let rects: Vec<DrawInstruction> =
            serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].bbox.y, 680.0);
    }

    #[test]
    fn test_bad_detector_page_fails_whole_response() {
        let (temp_dir, input, _) = setup();
        let detections = temp_dir.path().join("bad.json");
        fs::write(
            &detections,
            r#"[{"page": 4, "bbox": {"x": 0, "y": 0, "width": 1, "height": 1}, "text": "x"}]"#,
        )
        .unwrap();

        engine_cmd()
            .arg("project")
            .arg("--input")
            .arg(&input)
            .arg("--detections")
            .arg(&detections)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Detector response rejected"));
    }

    #[test]
    fn test_config_file_is_validated() {
        let (temp_dir, input, detections) = setup();
        let config = temp_dir.path().join("config.json");
        fs::write(&config, r#"{"page_visibility_threshold": 0}"#).unwrap();

        engine_cmd()
            .arg("--config")
            .arg(&config)
            .arg("project")
            .arg("--input")
            .arg(&input)
            .arg("--detections")
            .arg(&detections)
            .assert()
            .failure()
            .stderr(predicate::str::contains("page_visibility_threshold"));
    }
}
