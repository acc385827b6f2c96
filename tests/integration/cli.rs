//! End-to-end tests of the `jobrender` binary.

use assert_cmd::Command;
use jobrender::properties::PropertyValue;
use jobrender::test_utils::{
    bundled_release_root, cleanup_properties, manifest_yaml, message_format_properties,
};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory with a manifest for `syslog_forwarder`.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new(properties: &PropertyValue) -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("manifest.yml"), manifest_yaml("syslog_forwarder", properties))
            .unwrap();
        Self {
            temp,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// A command isolated from the user's config, pointed at the bundled release.
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("jobrender").unwrap();
        cmd.env("JOBRENDER_CONFIG_PATH", self.path("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(self.temp.path());
        cmd
    }

    fn with_release(&self, args: &[&str]) -> Command {
        let mut cmd = self.command();
        cmd.args(args).arg("--release").arg(bundled_release_root());
        cmd
    }
}

#[test]
fn test_render_to_stdout() {
    let ws = Workspace::new(&message_format_properties("job_index"));
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "--manifest", "manifest.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(include_str!(
            "../fixtures/rsyslog_with_job_index_format.conf"
        )));
}

#[test]
fn test_render_uses_identity_flags() {
    let ws = Workspace::new(&message_format_properties("job_index_id"));
    ws.with_release(&[
        "render",
        "syslog_forwarder",
        "config/rsyslog.conf",
        "--manifest",
        "manifest.yml",
        "--index",
        "4",
        "--id",
        "abc-123",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains(" syslog_forwarder/4/abc-123 "));
}

#[test]
fn test_identity_from_config_file() {
    let ws = Workspace::new(&message_format_properties("job_index_id"));
    fs::write(ws.path("config.toml"), "[identity]\nindex = 7\nid = \"from-config\"\n").unwrap();
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "-m", "manifest.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" syslog_forwarder/7/from-config "));
}

#[test]
fn test_release_dir_from_config_file() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    let root = bundled_release_root();
    fs::write(
        ws.path("config.toml"),
        format!("release_dir = {:?}\n", root.to_string_lossy()),
    )
    .unwrap();
    ws.command()
        .args(["render", "syslog_forwarder", "bin/pre-start"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/bin/bash"));
}

#[test]
fn test_render_writes_output_file() {
    let ws = Workspace::new(&cleanup_properties(&["00-default.conf", "../../etc/passwd"]));
    let output = ws.path("out/bin/pre-start");
    ws.with_release(&["render", "syslog_forwarder", "bin/pre-start", "-m", "manifest.yml"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let script = fs::read_to_string(output).unwrap();
    assert!(script.contains("rm -f /etc/rsyslog.d/00-default.conf"));
    assert!(!script.contains("/etc/passwd"));
}

#[test]
fn test_unknown_message_format_fails() {
    let ws = Workspace::new(&message_format_properties("crazy-format"));
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "-m", "manifest.yml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "unknown syslog.migration.message_format: crazy-format",
        ));
}

#[test]
fn test_near_miss_format_gets_suggestion() {
    let ws = Workspace::new(&message_format_properties("job_indx"));
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "-m", "manifest.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'job_index'?"));
}

#[test]
fn test_missing_job_in_manifest() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    fs::write(ws.path("other.yml"), manifest_yaml("syslog_storer", &PropertyValue::empty_mapping()))
        .unwrap();
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "-m", "other.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Job 'syslog_forwarder' not found"));
}

#[test]
fn test_unknown_template_destination() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    ws.with_release(&["render", "syslog_forwarder", "config/nope.conf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template 'config/nope.conf' not found"));
}

#[test]
fn test_context_prints_json() {
    let ws = Workspace::new(&message_format_properties("job_index"));
    let output = ws
        .with_release(&["context", "syslog_forwarder", "-m", "manifest.yml", "--index", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["index"], 3);
    assert_eq!(json["id"], "instance-id");
    assert_eq!(json["properties"]["syslog"]["migration"]["message_format"], "job_index");
    assert_eq!(json["properties"]["syslog"]["port"], 514);
}

#[test]
fn test_validate_reports_every_template() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    ws.with_release(&["validate", "syslog_forwarder", "-m", "manifest.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("syslog_forwarder/config/rsyslog.conf"))
        .stdout(predicate::str::contains("syslog_forwarder/bin/pre-start"))
        .stdout(predicate::str::contains("2/2 template(s) rendered"));
}

#[test]
fn test_validate_whole_release_without_job() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    ws.with_release(&["validate"]).assert().success();
}

#[test]
fn test_validate_json_reports_failure() {
    let ws = Workspace::new(&message_format_properties("crazy-format"));
    let output = ws
        .with_release(&["validate", "syslog_forwarder", "-m", "manifest.yml", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["templates_total"], 2);
    assert_eq!(json["templates_rendered"], 1);
    let failed: Vec<&serde_json::Value> =
        json["results"].as_array().unwrap().iter().filter(|r| r["rendered"] == false).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["template"], "config/rsyslog.conf");
}

#[test]
fn test_list_shaped_links_file_is_rejected() {
    let ws = Workspace::new(&PropertyValue::empty_mapping());
    fs::write(ws.path("links.yml"), "- name: syslog_storer\n  instances: []\n").unwrap();
    ws.with_release(&["render", "syslog_forwarder", "config/rsyslog.conf", "--links", "links.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("found a list"));
}
