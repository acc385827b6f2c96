//! Command-line interface for jobrender.
//!
//! # Available Commands
//!
//! - `render` - Render one template of a job to stdout or a file
//! - `context` - Print the merged render context as JSON
//! - `validate` - Render every template and report failures
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--config` - Path to a config file (default `~/.jobrender/config.toml`)
//!
//! # Example
//!
//! ```bash
//! # Render the rsyslog config the way a deployment would
//! jobrender render syslog_forwarder config/rsyslog.conf \
//!     --manifest manifest.yml --links links.yml --index 0 --id 5f0c8e1a
//!
//! # Inspect what the templates see
//! jobrender context syslog_forwarder --manifest manifest.yml
//!
//! # Check every template in the release
//! jobrender validate
//! ```

pub mod common;
mod context;
mod render;
pub mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RenderConfig;

/// Main CLI application structure for jobrender.
#[derive(Parser, Debug)]
#[command(
    name = "jobrender",
    about = "Render deployment job templates locally",
    version,
    long_about = "jobrender merges deployment manifest properties onto a job's spec defaults \
                  and renders the job's templates the way the deployment tool would."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    ///
    /// Overrides `$JOBRENDER_CONFIG_PATH` and `~/.jobrender/config.toml`.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one template of a job.
    Render(render::RenderCommand),

    /// Print the render context of a job as JSON.
    Context(context::ContextCommand),

    /// Render every template and report which ones fail.
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Log filter directive implied by `--verbose`/`--quiet`.
    ///
    /// `None` means the caller should honor `RUST_LOG`.
    #[must_use]
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Loads the config file and runs the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = RenderConfig::load_with_optional(self.config).await?;
        self.command.execute(&config).await
    }
}

impl Commands {
    async fn execute(self, config: &RenderConfig) -> Result<()> {
        match self {
            Self::Render(cmd) => cmd.execute(config).await,
            Self::Context(cmd) => cmd.execute(config).await,
            Self::Validate(cmd) => cmd.execute(config).await,
        }
    }
}
