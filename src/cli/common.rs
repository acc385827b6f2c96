//! Inputs shared by every command that renders a job.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::RenderConfig;
use crate::core::JobRenderError;
use crate::links::Links;
use crate::manifest::DeploymentManifest;
use crate::properties::PropertyValue;
use crate::release::{Job, ReleaseDir};
use crate::templating::{Identity, RenderContext};

/// Where the job, its property overrides and its links come from.
#[derive(Args, Debug, Clone, Default)]
pub struct RenderInputs {
    /// Release root containing `jobs/<job>/spec`
    ///
    /// Falls back to `release_dir` from the config file, then to the
    /// current directory.
    #[arg(long, value_name = "DIR")]
    pub release: Option<PathBuf>,

    /// Deployment manifest providing property overrides
    ///
    /// Without a manifest the job renders with its spec defaults only.
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// YAML file with the links the job consumes, keyed by link name
    #[arg(long, value_name = "FILE")]
    pub links: Option<PathBuf>,

    /// Instance group to look the job up in (defaults to the first group)
    #[arg(long, value_name = "NAME", requires = "manifest")]
    pub instance_group: Option<String>,

    /// Instance index exposed to templates as `index`
    #[arg(long)]
    pub index: Option<u64>,

    /// Instance id exposed to templates as `id`
    #[arg(long)]
    pub id: Option<String>,
}

/// Everything loaded from [`RenderInputs`] except the job itself.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub release: ReleaseDir,
    pub manifest: Option<DeploymentManifest>,
    pub links: Links,
    pub identity: Identity,
}

impl RenderInputs {
    /// Resolves paths against `config` and reads the manifest and links files.
    pub async fn load(&self, config: &RenderConfig) -> Result<LoadedInputs> {
        let release_root = match &self.release {
            Some(path) => path.clone(),
            None => config.release_dir()?.unwrap_or_else(|| PathBuf::from(".")),
        };
        tracing::debug!("Using release at {}", release_root.display());

        let manifest = match &self.manifest {
            Some(path) => Some(DeploymentManifest::load(path).await?),
            None => None,
        };

        let links = match &self.links {
            Some(path) => Links::load(path).await?,
            None => Links::new(),
        };

        Ok(LoadedInputs {
            release: ReleaseDir::new(release_root),
            manifest,
            links,
            identity: config.identity(self.index, self.id.as_deref()),
        })
    }
}

impl LoadedInputs {
    /// Property overrides for `job`. Without a manifest there are none.
    pub fn overrides(
        &self,
        job: &str,
        instance_group: Option<&str>,
    ) -> Result<PropertyValue, JobRenderError> {
        match &self.manifest {
            Some(manifest) => manifest.job_properties(job, instance_group),
            None => Ok(PropertyValue::empty_mapping()),
        }
    }

    /// Deployment name from the manifest, when it has one.
    pub fn deployment(&self) -> Option<&str> {
        self.manifest.as_ref().map(|m| m.name.as_str()).filter(|name| !name.is_empty())
    }

    /// Merges `overrides` for `job` and builds its render context.
    pub fn render_context(&self, job: &Job, overrides: &PropertyValue) -> Result<RenderContext> {
        let context = job.build_context(overrides, self.links.clone(), self.identity.clone())?;
        Ok(match self.deployment() {
            Some(name) => context.with_deployment(name),
            None => context,
        })
    }
}

/// A single job loaded together with its context.
#[derive(Debug)]
pub struct JobSession {
    pub job: Job,
    pub context: RenderContext,
}

impl JobSession {
    /// Loads `job_name` and builds its render context from `inputs`.
    pub async fn open(job_name: &str, inputs: &RenderInputs, config: &RenderConfig) -> Result<Self> {
        let loaded = inputs.load(config).await?;
        let job = loaded.release.job(job_name).await?;
        let overrides = loaded.overrides(job_name, inputs.instance_group.as_deref())?;
        let context = loaded
            .render_context(&job, &overrides)
            .with_context(|| format!("Failed to prepare job '{job_name}'"))?;
        Ok(Self {
            job,
            context,
        })
    }

    pub fn render(&self, destination: &str) -> Result<String, JobRenderError> {
        self.job.render_context(destination, &self.context)
    }
}
