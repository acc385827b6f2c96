//! Render context building.
//!
//! The context is the data a job template sees. It is assembled once per
//! render from the resolved properties, the instance identity and the link
//! data, and is never mutated while templates render.
//!
//! Templates see these top-level variables:
//!
//! | Variable      | Contents                                        |
//! |---------------|-------------------------------------------------|
//! | `job.name`    | Name of the job being rendered                  |
//! | `index`       | Instance index within its group                 |
//! | `id`          | Instance id                                     |
//! | `deployment`  | Deployment name, when known                     |
//! | `properties`  | Resolved property tree                          |
//! | `links`       | Consumed links keyed by name                    |

use serde::Serialize;
use tera::Context as TeraContext;

use super::error::TemplateError;
use crate::constants::{SYNTHETIC_INSTANCE_ID, SYNTHETIC_INSTANCE_INDEX};
use crate::links::Links;
use crate::properties::ResolvedProperties;

/// Identity of the instance a template is rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub index: u64,
    pub id: String,
}

impl Identity {
    pub fn new(index: u64, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
        }
    }

    /// Fixed identity for deterministic renders (index 13, id `instance-id`).
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(SYNTHETIC_INSTANCE_INDEX, SYNTHETIC_INSTANCE_ID)
    }
}

/// Job metadata exposed as `job` in templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub name: String,
}

/// Everything a template can reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
    pub job: JobInfo,
    pub index: u64,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    pub properties: ResolvedProperties,
    pub links: Links,
}

impl RenderContext {
    /// Assembles a context. All inputs are moved in; nothing is shared with
    /// the caller afterwards.
    ///
    /// ```
    /// use jobrender::links::Links;
    /// use jobrender::properties::ResolvedProperties;
    /// use jobrender::templating::{Identity, RenderContext};
    ///
    /// let ctx = RenderContext::build(
    ///     "syslog_forwarder",
    ///     ResolvedProperties::default(),
    ///     Identity::synthetic(),
    ///     Links::new(),
    /// );
    /// assert_eq!(ctx.index, 13);
    /// assert_eq!(ctx.id, "instance-id");
    /// ```
    #[must_use]
    pub fn build(
        job_name: impl Into<String>,
        properties: ResolvedProperties,
        identity: Identity,
        links: Links,
    ) -> Self {
        let job_name = job_name.into();
        tracing::debug!(
            "Building render context for {} (index {}, id {}, {} link(s))",
            job_name,
            identity.index,
            identity.id,
            links.len()
        );
        Self {
            job: JobInfo {
                name: job_name,
            },
            index: identity.index,
            id: identity.id,
            deployment: None,
            properties,
            links,
        }
    }

    /// Sets the deployment name exposed as `deployment`.
    #[must_use]
    pub fn with_deployment(mut self, name: impl Into<String>) -> Self {
        self.deployment = Some(name.into());
        self
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.index, self.id.clone())
    }

    /// Converts the context for Tera.
    pub fn to_tera_context(&self) -> Result<TeraContext, TemplateError> {
        TeraContext::from_serialize(self).map_err(|e| TemplateError::Context {
            message: e.to_string(),
        })
    }
}
