use assert_cmd::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Binary isolated from any local or user configuration.
fn excavator(workdir: &TempDir) -> Command {
    let config = workdir.path().join("excavator.yaml");
    if !config.exists() {
        fs::write(&config, "hash:\n  gateway: dweb.link\n").expect("write config");
    }
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("excavator"));
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output");
    serde_json::from_str(stdout.trim()).expect("valid json")
}

#[test]
fn excavate_writes_the_report_file() {
    let workdir = TempDir::new().unwrap();
    let out = workdir.path().join("out");
    let outcome = stdout_json(
        excavator(&workdir)
            .args(["-o", "json", "excavate", "--input"])
            .arg(fixture("cart.json"))
            .arg("--output-dir")
            .arg(&out),
    );

    let report_path = out.join("excavation-report.json");
    assert_eq!(
        outcome["reportPath"].as_str().map(PathBuf::from),
        Some(report_path.clone())
    );
    assert_eq!(outcome["summary"]["virtualObjectCount"], 2);

    let report: Value = serde_json::from_slice(&fs::read(&report_path).unwrap()).unwrap();
    assert_eq!(report["runId"], outcome["runId"]);
    assert!(report["generatedAt"].is_string());
    let records = report["result"]["virtualObjects"].as_array().unwrap();
    let ids: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["root", "root.b"]);
    assert_eq!(report["result"]["root"]["kind"], "object");
    assert!(report["result"]["fingerprint"]
        .as_str()
        .unwrap()
        .starts_with("sha256_"));
}

#[test]
fn excavate_merges_document_and_styles() {
    let workdir = TempDir::new().unwrap();
    let outcome = stdout_json(
        excavator(&workdir)
            .args(["-o", "json", "excavate", "--styles", "--no-write", "--html"])
            .arg(fixture("page.html")),
    );
    assert!(outcome["reportPath"].is_null());
    let summary = &outcome["summary"];
    assert!(summary["domNodes"].as_u64().unwrap() > 0);
    assert_eq!(summary["categories"]["css-stylesheet"], 3);
}

#[test]
fn excavate_without_input_fails() {
    let workdir = TempDir::new().unwrap();
    excavator(&workdir).arg("excavate").assert().failure();
}

#[test]
fn inspect_dom_groups_tags_and_classes() {
    let workdir = TempDir::new().unwrap();
    let inspection = stdout_json(
        excavator(&workdir)
            .args(["-o", "json", "inspect-dom", "--html"])
            .arg(fixture("page.html")),
    );
    let sheet = &inspection["domSheets"][0];
    let card = sheet["classSummaries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|group| group["selector"] == ".card")
        .expect("card group");
    assert_eq!(card["count"], 2);
    let button = sheet["tagSummaries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|group| group["selector"] == "button")
        .expect("button group");
    assert_eq!(button["count"], 2);
}

#[test]
fn inspect_dom_styles_reads_local_sheets_only() {
    let workdir = TempDir::new().unwrap();
    let report = stdout_json(
        excavator(&workdir)
            .args(["-o", "json", "inspect-dom", "--styles", "--html"])
            .arg(fixture("page.html")),
    );
    let sheets = report["styles"]["stylesheets"].as_array().unwrap();
    let origins: Vec<&str> = sheets.iter().filter_map(|s| s["origin"].as_str()).collect();
    assert_eq!(
        origins,
        vec!["inline", "linked", "cross-origin-or-restricted"]
    );
    assert!(sheets[2]["error"].is_string());
}

#[test]
fn cid_prints_identifier_forms() {
    let workdir = TempDir::new().unwrap();
    let first = stdout_json(excavator(&workdir).args(["-o", "json", "cid", "--text", "hello"]));
    let second = stdout_json(excavator(&workdir).args(["-o", "json", "cid", "--text", "hello"]));

    let cid = first["cid"].as_str().unwrap();
    assert!(cid.starts_with('b'));
    assert_eq!(first["cid"], second["cid"]);
    assert_eq!(first["uri"], format!("ipfs://{cid}"));
    assert_eq!(first["gatewayUrl"], format!("https://dweb.link/{cid}"));
    assert_eq!(
        first["digest"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );

    let dag = stdout_json(excavator(&workdir).args([
        "-o", "json", "cid", "--text", "hello", "--codec", "dag-cbor",
    ]));
    assert_ne!(dag["cid"], first["cid"]);
    assert_eq!(dag["codec"], "dag-cbor");
}

#[test]
fn replay_prints_one_json_line_per_handle() {
    let workdir = TempDir::new().unwrap();
    let assert = excavator(&workdir)
        .args(["replay", "--url", "https://shop.example.com/", "--html"])
        .arg(fixture("page.html"))
        .arg("--events")
        .arg(fixture("steps.json"))
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    let summary: Vec<(u64, &str)> = lines
        .iter()
        .map(|line| (line["step"].as_u64().unwrap(), line["event"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![(0, "click"), (1, "pointerenter"), (3, "mutation")]
    );
    assert_eq!(lines[0]["label"], "Buy");
    assert_eq!(lines[2]["reason"], "visibility-hidden");
    assert_eq!(lines[2]["label"], "late offer");
}

#[test]
fn info_reports_effective_configuration() {
    let workdir = TempDir::new().unwrap();
    let info = stdout_json(
        excavator(&workdir)
            .env("EXCAVATOR__EXCAVATE__MAX_DEPTH", "3")
            .args(["-o", "json", "info"]),
    );
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(info["configLoaded"], true);
    assert_eq!(info["config"]["excavate"]["maxDepth"], 3);
    assert_eq!(info["config"]["hash"]["gateway"], "dweb.link");
    assert_eq!(info["envOverrides"][0], "EXCAVATOR__EXCAVATE__MAX_DEPTH");
}
