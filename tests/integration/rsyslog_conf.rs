//! Rendering `config/rsyslog.conf` of the bundled `syslog_forwarder` job.

use jobrender::core::JobRenderError;
use jobrender::links::Links;
use jobrender::properties::PropertyValue;
use jobrender::release::Job;
use jobrender::templating::{Identity, TemplateError};
use jobrender::test_utils::{
    bundled_release, init_test_logging, message_format_properties, syslog_storer_links,
};
use jobrender::validation::MessageFormat;

const RSYSLOG_CONF: &str = "config/rsyslog.conf";

async fn forwarder() -> Job {
    init_test_logging(None);
    bundled_release().job("syslog_forwarder").await.unwrap()
}

fn yaml(src: &str) -> PropertyValue {
    serde_yaml::from_str(src).unwrap()
}

fn render_with_storer(job: &Job, properties: &PropertyValue) -> Result<String, JobRenderError> {
    job.render(RSYSLOG_CONF, properties, syslog_storer_links(), Identity::synthetic())
}

#[tokio::test]
async fn test_rfc5424_format() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &message_format_properties("rfc5424")).unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_rfc5424_format.conf")));
}

#[tokio::test]
async fn test_rfc5424_is_the_default_format() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &PropertyValue::empty_mapping()).unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_rfc5424_format.conf")));
}

#[tokio::test]
async fn test_null_format_falls_back_to_rfc5424() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &yaml("syslog:\n  migration:\n    message_format: ~\n"))
        .unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_rfc5424_format.conf")));
}

#[tokio::test]
async fn test_job_index_format() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &message_format_properties("job_index")).unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_job_index_format.conf")));
    assert!(!conf.contains("instance@47450"));
}

#[tokio::test]
async fn test_job_index_id_format() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &message_format_properties("job_index_id")).unwrap();
    assert!(conf.contains(include_str!("../fixtures/rsyslog_with_job_index_id_format.conf")));
}

#[tokio::test]
async fn test_unknown_format_fails_with_property_and_value() {
    let job = forwarder().await;
    let err = render_with_storer(&job, &message_format_properties("crazy-format")).unwrap_err();
    assert_eq!(err.to_string(), "unknown syslog.migration.message_format: crazy-format");

    let JobRenderError::Template(TemplateError::ConfigValidation(validation)) = err else {
        panic!("expected a config validation error, got {err:?}");
    };
    assert_eq!(validation.path, "syslog.migration.message_format");
    assert_eq!(validation.value, "crazy-format");
}

#[tokio::test]
async fn test_identity_flows_into_message_format() {
    let job = forwarder().await;
    let conf = job
        .render(
            RSYSLOG_CONF,
            &message_format_properties("job_index_id"),
            Links::new(),
            Identity::new(2, "5f0c8e1a"),
        )
        .unwrap();
    assert!(conf.contains(" syslog_forwarder/2/5f0c8e1a %syslogtag%"));
}

#[tokio::test]
async fn test_storer_link_becomes_relp_target() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &PropertyValue::empty_mapping()).unwrap();
    assert!(conf.contains("module(load=\"omrelp\")"));
    assert!(conf.contains(
        "action(type=\"omrelp\" target=\"my.syslog_storer.bosh\" port=\"some-syslog-storer-port\" template=\"SyslogForwarderTemplate\")"
    ));
    assert!(conf.contains("\nstop\n"));
}

#[tokio::test]
async fn test_address_property_wins_over_link() {
    let job = forwarder().await;
    let properties =
        yaml("syslog:\n  address: 10.0.0.5\n  port: 6514\n  transport: udp\n");
    let conf = render_with_storer(&job, &properties).unwrap();
    assert!(conf.contains("action(type=\"omfwd\" target=\"10.0.0.5\" port=\"6514\" protocol=\"udp\""));
    assert!(!conf.contains("my.syslog_storer.bosh"));
}

#[tokio::test]
async fn test_no_drain_without_address_or_link() {
    let job = forwarder().await;
    let conf = job
        .render(RSYSLOG_CONF, &PropertyValue::empty_mapping(), Links::new(), Identity::synthetic())
        .unwrap();
    assert!(conf.contains("# No syslog drain configured"));
    assert!(!conf.contains("action("));
    assert!(conf.contains("$MaxMessageSize 8k"));
}

#[tokio::test]
async fn test_invalid_transport_is_rejected() {
    let job = forwarder().await;
    let err = render_with_storer(&job, &yaml("syslog:\n  address: 10.0.0.5\n  transport: sctp\n"))
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown syslog.transport: sctp");
}

#[tokio::test]
async fn test_fallback_servers() {
    let job = forwarder().await;
    let properties = yaml(
        r"
syslog:
  address: 10.0.0.5
  fallback_servers:
    - address: 10.0.0.6
      port: 1514
    - address: 10.0.0.7
      transport: relp
",
    );
    let conf = render_with_storer(&job, &properties).unwrap();
    assert!(conf.contains(
        "action(type=\"omfwd\" target=\"10.0.0.6\" port=\"1514\" protocol=\"tcp\" template=\"SyslogForwarderTemplate\" action.execOnlyWhenPreviousIsSuspended=\"on\")"
    ));
    assert!(conf.contains(
        "action(type=\"omrelp\" target=\"10.0.0.7\" port=\"514\" template=\"SyslogForwarderTemplate\" action.execOnlyWhenPreviousIsSuspended=\"on\")"
    ));
}

#[tokio::test]
async fn test_disabled_forwarding_emits_no_actions() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &yaml("syslog:\n  migration:\n    disabled: true\n"))
        .unwrap();
    assert!(conf.contains("# Forwarding disabled by syslog.migration.disabled"));
    assert!(!conf.contains("action("));
}

#[tokio::test]
async fn test_job_log_files_are_forwarded() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &PropertyValue::empty_mapping()).unwrap();
    assert!(conf.contains("module(load=\"imfile\")\n"));
    assert!(conf.contains(
        "input(type=\"imfile\" File=\"/var/vcap/sys/log/*/*.log\" Tag=\"syslog_forwarder\" addMetadata=\"on\" reopenOnTruncate=\"on\")\n"
    ));
}

#[tokio::test]
async fn test_disabled_forwarding_does_not_watch_log_files() {
    let job = forwarder().await;
    let conf = render_with_storer(&job, &yaml("syslog:\n  migration:\n    disabled: true\n"))
        .unwrap();
    assert!(!conf.contains("imfile"));
    assert!(!conf.contains("/var/vcap/sys/log"));
    assert!(conf.contains("input(type=\"imudp\" port=\"514\" address=\"127.0.0.1\")\n\ntemplate("));
}

#[tokio::test]
async fn test_custom_rule_is_included_verbatim() {
    let job = forwarder().await;
    let conf = render_with_storer(
        &job,
        &yaml("syslog:\n  custom_rule: \"if $programname == 'nginx' then stop\"\n"),
    )
    .unwrap();
    assert!(conf.contains("if $programname == 'nginx' then stop\n"));
}

#[tokio::test]
async fn test_rendering_is_idempotent() {
    let job = forwarder().await;
    let properties = message_format_properties("job_index");
    let first = render_with_storer(&job, &properties).unwrap();
    let second = render_with_storer(&job, &properties).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_every_known_format_renders() {
    let job = forwarder().await;
    for format in MessageFormat::ALL {
        let conf = render_with_storer(&job, &message_format_properties(format.as_str())).unwrap();
        assert!(conf.contains("template(name=\"SyslogForwarderTemplate\""), "{format}");
    }
}
