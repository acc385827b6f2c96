//! jobrender CLI entry point
//!
//! Parses arguments, installs the log subscriber and runs the command.
//! Errors are printed with suggestions and exit with status 1.
//!
//! - `render` - Render one template of a job
//! - `context` - Print the render context as JSON
//! - `validate` - Render every template of a job and report failures

use anyhow::Result;
use clap::Parser;
use jobrender::cli;
use jobrender::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let filter = match cli.log_level() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
