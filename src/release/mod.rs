//! Release directories and jobs.
//!
//! A release directory holds one directory per job under `jobs/`:
//!
//! ```text
//! <release>/jobs/<job>/spec
//! <release>/jobs/<job>/templates/<source>
//! ```
//!
//! [`ReleaseDir::job`] loads a job's spec and every template it declares.
//! The loaded [`Job`] merges property overrides onto the spec defaults and
//! renders templates by destination path:
//!
//! ```rust,no_run
//! use jobrender::links::Links;
//! use jobrender::properties::PropertyValue;
//! use jobrender::release::ReleaseDir;
//! use jobrender::templating::Identity;
//!
//! # async fn example() -> Result<(), jobrender::core::JobRenderError> {
//! let release = ReleaseDir::new(".");
//! let job = release.job("syslog_forwarder").await?;
//! let conf = job.render(
//!     "config/rsyslog.conf",
//!     &PropertyValue::empty_mapping(),
//!     Links::new(),
//!     Identity::synthetic(),
//! )?;
//! println!("{conf}");
//! # Ok(())
//! # }
//! ```

pub mod job_spec;

pub use job_spec::{ConsumedLink, JobSpec, TemplateDeclaration};

use std::path::{Path, PathBuf};

use crate::constants::{JOB_SPEC_FILE, JOBS_DIR, TEMPLATES_DIR};
use crate::core::JobRenderError;
use crate::links::Links;
use crate::properties::{PropertySchema, PropertyValue, merge};
use crate::templating::{Identity, RenderContext, RenderingMetadata, TemplateRenderer};

/// Root of a release checkout.
#[derive(Debug, Clone)]
pub struct ReleaseDir {
    root: PathBuf,
}

impl ReleaseDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, name: &str) -> PathBuf {
        self.root.join(JOBS_DIR).join(name)
    }

    /// Loads the job `name` with all of its templates.
    ///
    /// # Errors
    ///
    /// - [`JobRenderError::MissingSchema`] when `jobs/<name>/spec` does not exist
    /// - [`JobRenderError::SchemaParse`] when the spec is malformed
    /// - [`JobRenderError::MissingTemplate`] when a declared template file is missing
    pub async fn job(&self, name: &str) -> Result<Job, JobRenderError> {
        let dir = self.job_dir(name);
        let spec_path = dir.join(JOB_SPEC_FILE);

        let content = match tokio::fs::read_to_string(&spec_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JobRenderError::MissingSchema {
                    job: name.to_string(),
                    path: spec_path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let spec = JobSpec::parse(&content, &spec_path.display().to_string())?;
        if spec.name != name {
            tracing::warn!(
                "Job directory '{}' holds a spec named '{}'; using the directory name",
                name,
                spec.name
            );
        }

        let mut templates = Vec::with_capacity(spec.templates.len());
        for declaration in &spec.templates {
            let path = dir.join(TEMPLATES_DIR).join(&declaration.source);
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                tracing::debug!("Failed to read template {}: {}", path.display(), e);
                JobRenderError::MissingTemplate {
                    job: name.to_string(),
                    template: declaration.source.clone(),
                }
            })?;
            templates.push(JobTemplate {
                source: declaration.source.clone(),
                destination: declaration.destination.clone(),
                path,
                content,
            });
        }

        tracing::debug!(
            "Loaded job {} with {} properties and {} template(s)",
            name,
            spec.properties.len(),
            templates.len()
        );

        Ok(Job {
            name: name.to_string(),
            spec,
            templates,
        })
    }

    /// Names of all jobs that have a spec file, sorted.
    pub async fn job_names(&self) -> Result<Vec<String>, JobRenderError> {
        let jobs_dir = self.root.join(JOBS_DIR);
        let mut entries = tokio::fs::read_dir(&jobs_dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JobRenderError::Other {
                    message: format!("No jobs directory at {}", jobs_dir.display()),
                }
            } else {
                e.into()
            }
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let has_spec =
                tokio::fs::try_exists(entry.path().join(JOB_SPEC_FILE)).await.unwrap_or(false);
            if has_spec {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A template file loaded from a job.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub source: String,
    pub destination: String,
    pub path: PathBuf,
    pub content: String,
}

/// A loaded job: its spec and template bodies.
#[derive(Debug, Clone)]
pub struct Job {
    name: String,
    spec: JobSpec,
    templates: Vec<JobTemplate>,
}

impl Job {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn spec(&self) -> &JobSpec {
        &self.spec
    }

    #[must_use]
    pub const fn schema(&self) -> &PropertySchema {
        &self.spec.properties
    }

    pub fn templates(&self) -> impl Iterator<Item = &JobTemplate> {
        self.templates.iter()
    }

    /// Looks a template up by destination path, e.g. `config/rsyslog.conf`.
    pub fn template(&self, destination: &str) -> Result<&JobTemplate, JobRenderError> {
        self.templates.iter().find(|t| t.destination == destination).ok_or_else(|| {
            JobRenderError::MissingTemplate {
                job: self.name.clone(),
                template: destination.to_string(),
            }
        })
    }

    /// Merges `overrides` onto the spec defaults and assembles the render context.
    ///
    /// # Errors
    ///
    /// Returns [`JobRenderError::MissingLink`] when a non-optional consumed
    /// link is absent from `links`.
    pub fn build_context(
        &self,
        overrides: &PropertyValue,
        links: Links,
        identity: Identity,
    ) -> Result<RenderContext, JobRenderError> {
        if let Some(missing) = self.spec.required_links().find(|link| !links.contains(&link.name)) {
            return Err(JobRenderError::MissingLink {
                job: self.name.clone(),
                link: missing.name.clone(),
            });
        }

        for (name, _) in links.iter() {
            if !self.spec.consumes.iter().any(|c| &c.name == name) {
                tracing::debug!("Link '{}' is not consumed by job {}", name, self.name);
            }
        }

        let resolved = merge(self.schema(), overrides);
        Ok(RenderContext::build(self.name.clone(), resolved, identity, links))
    }

    /// Renders the template at `destination` with a freshly built context.
    pub fn render(
        &self,
        destination: &str,
        overrides: &PropertyValue,
        links: Links,
        identity: Identity,
    ) -> Result<String, JobRenderError> {
        let context = self.build_context(overrides, links, identity)?;
        self.render_context(destination, &context)
    }

    /// Renders the template at `destination` against an existing context.
    pub fn render_context(
        &self,
        destination: &str,
        context: &RenderContext,
    ) -> Result<String, JobRenderError> {
        let template = self.template(destination)?;
        let renderer = TemplateRenderer::new(context)?;
        let metadata = RenderingMetadata {
            job_name: self.name.clone(),
            template: template.destination.clone(),
            source_path: Some(template.path.clone()),
        };
        Ok(renderer.render_template(&template.content, Some(&metadata))?)
    }
}
