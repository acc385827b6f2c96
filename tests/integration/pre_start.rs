//! Rendering `bin/pre-start` of the bundled `syslog_forwarder` job.

use jobrender::links::Links;
use jobrender::properties::PropertyValue;
use jobrender::templating::Identity;
use jobrender::test_utils::{bundled_release, cleanup_properties, init_test_logging};

async fn render_pre_start(properties: &PropertyValue) -> String {
    init_test_logging(None);
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    job.render("bin/pre-start", properties, Links::new(), Identity::synthetic()).unwrap()
}

#[tokio::test]
async fn test_does_not_delete_any_files_by_default() {
    let script = render_pre_start(&PropertyValue::empty_mapping()).await;
    assert!(!script.contains("rm -f"));
    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("set -e"));
}

#[tokio::test]
async fn test_deletes_files_in_rsyslog_d() {
    let script = render_pre_start(&cleanup_properties(&["00-default.conf", "01-custom.conf"])).await;
    assert!(script.contains("rm -f /etc/rsyslog.d/00-default.conf\n"));
    assert!(script.contains("rm -f /etc/rsyslog.d/01-custom.conf\n"));

    let first = script.find("00-default.conf").unwrap();
    let second = script.find("01-custom.conf").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn test_does_not_delete_files_outside_rsyslog_d() {
    let script = render_pre_start(&cleanup_properties(&[
        "../../var/log/syslog",
        "../../var/vcap/store/my_data.yml",
        "00-default.conf",
    ]))
    .await;
    assert!(script.contains("rm -f /etc/rsyslog.d/00-default.conf"));
    assert!(!script.contains("/var/log/syslog"));
    assert!(!script.contains("/var/vcap/store/my_data.yml"));
    assert_eq!(script.matches("rm -f").count(), 1);
}

#[tokio::test]
async fn test_absolute_entries_must_stay_inside_rsyslog_d() {
    let script = render_pre_start(&cleanup_properties(&[
        "/etc/rsyslog.d/02-extra.conf",
        "/etc/passwd",
        "/etc/rsyslog.d.bak/evil.conf",
    ]))
    .await;
    assert!(script.contains("rm -f /etc/rsyslog.d/02-extra.conf"));
    assert!(!script.contains("/etc/passwd"));
    assert!(!script.contains("rsyslog.d.bak"));
}

#[tokio::test]
async fn test_null_cleanup_list_deletes_nothing() {
    let properties: PropertyValue =
        serde_yaml::from_str("syslog:\n  migration:\n    cleanup_conf_files: ~\n").unwrap();
    let script = render_pre_start(&properties).await;
    assert!(!script.contains("rm -f"));
}

#[tokio::test]
async fn test_non_string_entries_are_skipped() {
    let properties: PropertyValue = serde_yaml::from_str(
        "syslog:\n  migration:\n    cleanup_conf_files: [42, {a: b}, 00-default.conf]\n",
    )
    .unwrap();
    let script = render_pre_start(&properties).await;
    assert_eq!(script.matches("rm -f").count(), 1);
    assert!(script.contains("rm -f /etc/rsyslog.d/00-default.conf"));
}

#[tokio::test]
async fn test_names_with_shell_metacharacters_are_quoted() {
    let script = render_pre_start(&cleanup_properties(&["my custom.conf", "x;reboot.conf"])).await;
    assert!(script.contains("rm -f '/etc/rsyslog.d/my custom.conf'\n"));
    assert!(script.contains("rm -f '/etc/rsyslog.d/x;reboot.conf'\n"));
}
