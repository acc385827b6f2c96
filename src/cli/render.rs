//! Render one template of a job.
//!
//! ```bash
//! jobrender render syslog_forwarder config/rsyslog.conf --manifest manifest.yml
//! jobrender render syslog_forwarder bin/pre-start --output out/pre-start
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::{JobSession, RenderInputs};
use crate::config::RenderConfig;

/// Render a job template to stdout or a file.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Job name (directory under `jobs/`)
    pub job: String,

    /// Template destination path as declared in the job spec, e.g. `config/rsyslog.conf`
    pub template: String,

    #[command(flatten)]
    pub inputs: RenderInputs,

    /// Write the rendered file here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub async fn execute(self, config: &RenderConfig) -> Result<()> {
        let session = JobSession::open(&self.job, &self.inputs, config).await?;
        let rendered = session.render(&self.template)?;

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create directory {}", parent.display())
                    })?;
                }
                tokio::fs::write(path, &rendered)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Rendered {}/{} to {}", self.job, self.template, path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }
}
