//! Property merging and context building through a loaded `Job`.

use std::fs;

use jobrender::core::JobRenderError;
use jobrender::links::Links;
use jobrender::manifest::DeploymentManifest;
use jobrender::properties::PropertyValue;
use jobrender::release::ReleaseDir;
use jobrender::templating::Identity;
use jobrender::test_utils::{bundled_release, init_test_logging, syslog_storer_links};
use tempfile::TempDir;

fn yaml(src: &str) -> PropertyValue {
    serde_yaml::from_str(src).unwrap()
}

#[tokio::test]
async fn test_defaults_fill_gaps_and_overrides_win() {
    init_test_logging(None);
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let overrides = yaml(
        r"
syslog:
  port: 6514
  address: ~
  fallback_servers: []
  migration:
    disabled: false
extra:
  thing: kept
",
    );

    let ctx = job.build_context(&overrides, Links::new(), Identity::synthetic()).unwrap();
    let props = &ctx.properties;

    assert_eq!(props.get("syslog.port"), Some(&PropertyValue::Integer(6514)));
    assert_eq!(props.get("syslog.address"), Some(&PropertyValue::Null));
    assert_eq!(props.get("syslog.fallback_servers"), Some(&PropertyValue::Sequence(vec![])));
    assert_eq!(props.get("syslog.migration.disabled"), Some(&PropertyValue::Bool(false)));
    assert_eq!(props.get("syslog.transport"), Some(&PropertyValue::from("tcp")));
    assert_eq!(
        props.get("syslog.migration.message_format"),
        Some(&PropertyValue::from("rfc5424"))
    );
    assert_eq!(props.get("extra.thing"), Some(&PropertyValue::from("kept")));
}

#[tokio::test]
async fn test_every_declared_property_is_resolved() {
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let ctx = job
        .build_context(&PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap();
    for definition in job.schema().iter() {
        assert!(
            ctx.properties.get(&definition.name).is_some(),
            "{} missing from resolved properties",
            definition.name
        );
    }
}

#[tokio::test]
async fn test_contexts_do_not_share_defaults() {
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let first = job
        .build_context(&PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap();
    let second = job
        .build_context(
            &yaml("syslog:\n  migration:\n    cleanup_conf_files: [a.conf]\n"),
            Links::new(),
            Identity::synthetic(),
        )
        .unwrap();

    assert_eq!(
        first.properties.get("syslog.migration.cleanup_conf_files"),
        Some(&PropertyValue::Sequence(vec![]))
    );
    assert_eq!(
        second.properties.get("syslog.migration.cleanup_conf_files"),
        Some(&PropertyValue::Sequence(vec![PropertyValue::from("a.conf")]))
    );
}

#[tokio::test]
async fn test_context_serializes_for_inspection() {
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let ctx = job
        .build_context(&PropertyValue::empty_mapping(), syslog_storer_links(), Identity::synthetic())
        .unwrap()
        .with_deployment("logging");

    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json["job"]["name"], "syslog_forwarder");
    assert_eq!(json["index"], 13);
    assert_eq!(json["id"], "instance-id");
    assert_eq!(json["deployment"], "logging");
    assert_eq!(json["properties"]["syslog"]["port"], 514);
    assert_eq!(
        json["links"]["syslog_storer"]["instances"][0]["address"],
        "my.syslog_storer.bosh"
    );
}

#[tokio::test]
async fn test_deployment_name_appears_in_structured_data() {
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let ctx = job
        .build_context(&PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap()
        .with_deployment("logging");
    let conf = job.render_context("config/rsyslog.conf", &ctx).unwrap();
    assert!(conf.contains(
        r#"[instance@47450 deployment=\"logging\" job=\"syslog_forwarder\" index=\"13\" id=\"instance-id\"]"#
    ));
}

#[tokio::test]
async fn test_manifest_overrides_drive_rendering() {
    let manifest = DeploymentManifest::from_yaml_str(
        r"
name: logging
instance_groups:
  - name: forwarder
    instances: 1
    jobs:
      - name: syslog_forwarder
        properties:
          syslog:
            migration:
              message_format: job_index
",
    )
    .unwrap();
    let overrides = manifest.job_properties("syslog_forwarder", None).unwrap();

    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let conf = job
        .render("config/rsyslog.conf", &overrides, Links::new(), Identity::synthetic())
        .unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_job_index_format.conf")));
}

#[tokio::test]
async fn test_links_document_round_trip_into_render() {
    let links = Links::from_yaml_str(
        r"
syslog_storer:
  instances:
    - address: storer.internal
      index: 0
  properties:
    syslog:
      port: 2514
      transport: tcp
",
    )
    .unwrap();
    let job = bundled_release().job("syslog_forwarder").await.unwrap();
    let conf = job
        .render("config/rsyslog.conf", &PropertyValue::empty_mapping(), links, Identity::synthetic())
        .unwrap();
    assert!(conf.contains(r#"action(type="omfwd" target="storer.internal" port="2514" protocol="tcp""#));
}

#[tokio::test]
async fn test_list_shaped_links_are_rejected() {
    let err = Links::from_yaml_str("- name: syslog_storer\n  instances: []\n").unwrap_err();
    assert!(matches!(err, JobRenderError::LinksParse { .. }));
}

#[tokio::test]
async fn test_lookup_errors() {
    let release = bundled_release();
    assert!(matches!(
        release.job("no_such_job").await,
        Err(JobRenderError::MissingSchema { .. })
    ));

    let job = release.job("syslog_forwarder").await.unwrap();
    let err = job
        .render("config/missing.conf", &PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap_err();
    assert!(matches!(err, JobRenderError::MissingTemplate { .. }));

    assert_eq!(release.job_names().await.unwrap(), vec!["syslog_forwarder".to_string()]);
}

#[tokio::test]
async fn test_required_link_must_be_supplied() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("jobs").join("shipper");
    fs::create_dir_all(dir.join("templates")).unwrap();
    fs::write(
        dir.join("spec"),
        "name: shipper\ntemplates:\n  out.tera: config/out\nconsumes:\n  - name: drain\n    type: syslog_storer\nproperties: {}\n",
    )
    .unwrap();
    fs::write(
        dir.join("templates").join("out.tera"),
        "{% for i in links.drain.instances %}{{ i.address }}{% endfor %}",
    )
    .unwrap();

    let job = ReleaseDir::new(temp.path()).job("shipper").await.unwrap();
    let err = job
        .render("config/out", &PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap_err();
    assert!(matches!(err, JobRenderError::MissingLink { ref link, .. } if link == "drain"));

    let links = Links::from_yaml_str("drain:\n  instances:\n    - address: a.internal\n").unwrap();
    let out = job
        .render("config/out", &PropertyValue::empty_mapping(), links, Identity::synthetic())
        .unwrap();
    assert_eq!(out, "a.internal");
}
