use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn mapper() -> Command {
    Command::cargo_bin("descriptor-mapper").unwrap()
}

#[test]
fn test_parse_reports_summary() {
    mapper()
        .arg("parse")
        .arg(fixture("application.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed application from"))
        .stdout(predicate::str::contains("Modules: 3"))
        .stdout(predicate::str::contains("Resource definitions: 3"))
        .stdout(predicate::str::contains("Warnings").not());
}

#[test]
fn test_parse_runtime_document() {
    mapper()
        .arg("parse")
        .arg(fixture("glassfish-application.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed glassfish-application"))
        .stdout(predicate::str::contains("References: 2"))
        .stdout(predicate::str::contains("Properties: 1"));
}

#[test]
fn test_roundtrip_to_stdout() {
    mapper()
        .arg("roundtrip")
        .arg(fixture("application.xml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("<context-root>/shop</context-root>"));
}

#[test]
fn test_roundtrip_to_file() {
    let temp_dir = tempdir().unwrap();
    let output = temp_dir.path().join("application.xml");

    mapper()
        .arg("roundtrip")
        .arg(fixture("application.xml"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("<application-name>shop</application-name>"));
    assert!(written.contains("<data-source>"));
}

#[test]
fn test_dump_with_config_properties() {
    mapper()
        .arg("dump")
        .arg(fixture("application.xml"))
        .arg("--config")
        .arg(fixture("config.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---\n"))
        .stdout(predicate::str::contains("display_name: Shop"))
        .stdout(predicate::str::contains("${shop.max.items}").not());
}

#[test]
fn test_dump_with_property_override() {
    mapper()
        .args(["dump", "--property", "shop.max.items=75"])
        .arg(fixture("application.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("75"));
}

#[test]
fn test_malformed_document_fails() {
    mapper()
        .arg("parse")
        .arg(fixture("broken-application.xml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unknown_document_fails() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("web.xml");
    fs::write(&path, "<web-app/>").unwrap();

    mapper()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown document type with root <web-app>"));
}

#[test]
fn test_invalid_property_fails() {
    mapper()
        .args(["parse", "--property", "novalue"])
        .arg(fixture("application.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}
