//! Deployment manifest parsing.
//!
//! A deployment manifest lists instance groups and the jobs placed on them,
//! together with the property overrides for each job:
//!
//! ```yaml
//! name: logging
//! instance_groups:
//!   - name: forwarder
//!     instances: 1
//!     jobs:
//!       - name: syslog_forwarder
//!         release: syslog
//!         properties:
//!           syslog:
//!             migration:
//!               message_format: job_index
//! ```
//!
//! Only the parts needed to render a job are modelled. Unknown keys are
//! ignored so full manifests can be used as input.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::INLINE_SOURCE;
use crate::core::JobRenderError;
use crate::properties::PropertyValue;

/// A job placed on an instance group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestJob {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Property overrides; absent means none.
    #[serde(default)]
    pub properties: PropertyValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    pub name: String,
    #[serde(default)]
    pub instances: u32,
    #[serde(default)]
    pub jobs: Vec<ManifestJob>,
}

/// The parts of a deployment manifest used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeploymentManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instance_groups: Vec<InstanceGroup>,
}

impl DeploymentManifest {
    /// A manifest with one instance group holding `job` with `properties`.
    ///
    /// Useful for rendering a job without writing a manifest file.
    pub fn single_job(job: impl Into<String>, properties: PropertyValue) -> Self {
        let job = job.into();
        Self {
            name: String::new(),
            instance_groups: vec![InstanceGroup {
                name: job.clone(),
                instances: 1,
                jobs: vec![ManifestJob {
                    name: job,
                    release: None,
                    properties,
                }],
            }],
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, JobRenderError> {
        Self::parse(content, INLINE_SOURCE)
    }

    /// Reads and parses a manifest file.
    pub async fn load(path: &Path) -> Result<Self, JobRenderError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            JobRenderError::ManifestParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let manifest = Self::parse(&content, &path.display().to_string())?;
        tracing::debug!(
            "Loaded manifest '{}' with {} instance group(s) from {}",
            manifest.name,
            manifest.instance_groups.len(),
            path.display()
        );
        Ok(manifest)
    }

    fn parse(content: &str, file: &str) -> Result<Self, JobRenderError> {
        serde_yaml::from_str(content).map_err(|e| JobRenderError::ManifestParse {
            file: file.to_string(),
            reason: e.to_string(),
        })
    }

    /// Finds `job` in the named instance group, or in the first group when
    /// `instance_group` is `None`.
    pub fn find_job(
        &self,
        job: &str,
        instance_group: Option<&str>,
    ) -> Result<&ManifestJob, JobRenderError> {
        let missing = || JobRenderError::MissingJob {
            job: job.to_string(),
            instance_group: instance_group.map(str::to_string),
        };

        let group = match instance_group {
            Some(name) => self.instance_groups.iter().find(|g| g.name == name),
            None => self.instance_groups.first(),
        }
        .ok_or_else(missing)?;

        group.jobs.iter().find(|j| j.name == job).ok_or_else(missing)
    }

    /// Property overrides for `job`. A job without properties yields an
    /// empty mapping.
    pub fn job_properties(
        &self,
        job: &str,
        instance_group: Option<&str>,
    ) -> Result<PropertyValue, JobRenderError> {
        let found = self.find_job(job, instance_group)?;
        Ok(match &found.properties {
            PropertyValue::Null => PropertyValue::empty_mapping(),
            other => other.clone(),
        })
    }
}
