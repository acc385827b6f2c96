//! Print the render context a job's templates would see, as pretty JSON.
//!
//! Useful for checking how manifest overrides merged with spec defaults.

use anyhow::Result;
use clap::Args;

use super::common::{JobSession, RenderInputs};
use crate::config::RenderConfig;

/// Show the merged render context of a job.
#[derive(Args, Debug)]
pub struct ContextCommand {
    /// Job name (directory under `jobs/`)
    pub job: String,

    #[command(flatten)]
    pub inputs: RenderInputs,
}

impl ContextCommand {
    pub async fn execute(self, config: &RenderConfig) -> Result<()> {
        let session = JobSession::open(&self.job, &self.inputs, config).await?;
        println!("{}", serde_json::to_string_pretty(&session.context)?);
        Ok(())
    }
}
