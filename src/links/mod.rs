//! Link data shared between jobs.
//!
//! A job can consume links provided by other jobs, such as the address of a
//! log storer. Links are supplied as a YAML mapping keyed by link name:
//!
//! ```yaml
//! syslog_storer:
//!   instances:
//!     - address: 10.0.0.5
//!       index: 0
//!   properties:
//!     syslog:
//!       port: 6514
//!       transport: relp
//! ```
//!
//! A top-level list of links is rejected instead of being guessed at.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::INLINE_SOURCE;
use crate::core::JobRenderError;
use crate::properties::PropertyMap;

/// One instance of the job providing a link.
/// Fields beyond these (`name`, `az`, `bootstrap`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInstance {
    /// Network address of the instance
    pub address: String,
    /// Instance index within its group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    /// Instance id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl LinkInstance {
    /// An instance known only by address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            index: None,
            id: None,
        }
    }
}

/// Data published by a providing job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Providing instances, in group order
    #[serde(default)]
    pub instances: Vec<LinkInstance>,
    /// Properties the provider exposes through the link
    #[serde(default)]
    pub properties: PropertyMap,
}

/// All links available to one render, keyed by link name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

impl Links {
    /// No links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a link.
    pub fn insert(&mut self, name: impl Into<String>, link: Link) -> Option<Link> {
        self.0.insert(name.into(), link)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Link> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Link)> {
        self.0.iter()
    }

    /// Every instance of the named link; empty when the link is absent.
    pub fn instances(&self, name: &str) -> impl Iterator<Item = &LinkInstance> {
        self.0.get(name).into_iter().flat_map(|link| link.instances.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a links document. An empty document yields no links.
    pub fn from_yaml_str(content: &str) -> Result<Self, JobRenderError> {
        Self::parse(content, INLINE_SOURCE)
    }

    /// Reads and parses a links file.
    pub async fn load(path: &Path) -> Result<Self, JobRenderError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            JobRenderError::LinksParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let links = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!("Loaded {} link(s) from {}", links.len(), path.display());
        Ok(links)
    }

    fn parse(content: &str, file: &str) -> Result<Self, JobRenderError> {
        let parse_error = |reason: String| JobRenderError::LinksParse {
            file: file.to_string(),
            reason,
        };

        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        match value {
            serde_yaml::Value::Null => Ok(Self::new()),
            serde_yaml::Value::Mapping(_) => {
                serde_yaml::from_value(value).map_err(|e| parse_error(e.to_string()))
            }
            serde_yaml::Value::Sequence(_) => Err(parse_error(
                "expected a mapping keyed by link name, found a list".to_string(),
            )),
            _ => Err(parse_error("expected a mapping keyed by link name".to_string())),
        }
    }
}

impl FromIterator<(String, Link)> for Links {
    fn from_iter<T: IntoIterator<Item = (String, Link)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
