//! Test utilities for jobrender
//!
//! Helpers shared by unit and integration tests: logging setup, the bundled
//! release, and builders for the property overrides and links the
//! `syslog_forwarder` tests use.
//!
//! Integration tests get this module through the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use jobrender::test_utils::{bundled_release, message_format_properties, syslog_storer_links};
//! use jobrender::templating::Identity;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let job = bundled_release().job("syslog_forwarder").await?;
//! let conf = job.render(
//!     "config/rsyslog.conf",
//!     &message_format_properties("job_index"),
//!     syslog_storer_links(),
//!     Identity::synthetic(),
//! )?;
//! assert!(conf.contains("syslog_forwarder/13"));
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::links::{Link, LinkInstance, Links};
use crate::properties::{PropertyMap, PropertyValue};
use crate::release::ReleaseDir;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without logging.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Root of the release bundled with this crate (the directory holding `jobs/`).
#[must_use]
pub fn bundled_release_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

#[must_use]
pub fn bundled_release() -> ReleaseDir {
    ReleaseDir::new(bundled_release_root())
}

/// Builds a nested property tree from `(dotted.path, value)` pairs.
///
/// ```
/// use jobrender::properties::PropertyValue;
/// use jobrender::test_utils::properties;
///
/// let tree = properties(&[("syslog.port", PropertyValue::Integer(6514))]);
/// assert_eq!(tree.lookup("syslog.port"), Some(&PropertyValue::Integer(6514)));
/// ```
#[must_use]
pub fn properties(pairs: &[(&str, PropertyValue)]) -> PropertyValue {
    PropertyValue::Mapping(property_map(pairs))
}

fn property_map(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
    let mut root = PropertyMap::new();
    for (path, value) in pairs {
        insert_dotted(&mut root, path, value.clone());
    }
    root
}

fn insert_dotted(map: &mut PropertyMap, path: &str, value: PropertyValue) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map.entry(head.to_string()).or_insert_with(PropertyValue::empty_mapping);
            if !matches!(child, PropertyValue::Mapping(_)) {
                *child = PropertyValue::empty_mapping();
            }
            if let PropertyValue::Mapping(child_map) = child {
                insert_dotted(child_map, rest, value);
            }
        }
    }
}

/// Overrides selecting a message format.
#[must_use]
pub fn message_format_properties(format: &str) -> PropertyValue {
    properties(&[("syslog.migration.message_format", PropertyValue::from(format))])
}

/// Overrides listing files to remove during pre-start.
#[must_use]
pub fn cleanup_properties(files: &[&str]) -> PropertyValue {
    let entries = files.iter().map(|f| PropertyValue::from(*f)).collect();
    properties(&[("syslog.migration.cleanup_conf_files", PropertyValue::Sequence(entries))])
}

/// A `syslog_storer` link with one instance that speaks RELP.
#[must_use]
pub fn syslog_storer_links() -> Links {
    let link_properties = property_map(&[
        ("syslog.port", PropertyValue::from("some-syslog-storer-port")),
        ("syslog.transport", PropertyValue::from("relp")),
    ]);

    let mut links = Links::new();
    links.insert(
        "syslog_storer",
        Link {
            instances: vec![LinkInstance::new("my.syslog_storer.bosh")],
            properties: link_properties,
        },
    );
    links
}

/// A deployment manifest placing `job` with `properties` on one instance group.
#[must_use]
pub fn manifest_yaml(job: &str, properties: &PropertyValue) -> String {
    let manifest = crate::manifest::DeploymentManifest::single_job(job, properties.clone());
    serde_yaml::to_string(&manifest).unwrap_or_default()
}
