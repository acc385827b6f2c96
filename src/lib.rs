//! jobrender - property resolution and template rendering for deployment jobs
//!
//! A deployment job ships a spec declaring its properties with defaults, plus
//! templates that turn resolved properties into configuration files and
//! lifecycle scripts. jobrender reproduces what the deployment tool does at
//! deploy time so templates can be rendered and tested locally:
//!
//! 1. Load the job from a release directory ([`release`])
//! 2. Merge manifest overrides onto the spec defaults ([`properties`])
//! 3. Build the render context with instance identity and links ([`templating`])
//! 4. Render with Tera, validating enumerated properties ([`validation`]) and
//!    confining cleanup paths ([`utils::path_validation`])
//!
//! # Example
//!
//! ```rust,no_run
//! use jobrender::links::Links;
//! use jobrender::manifest::DeploymentManifest;
//! use jobrender::release::ReleaseDir;
//! use jobrender::templating::Identity;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let manifest = DeploymentManifest::load("manifest.yml".as_ref()).await?;
//! let overrides = manifest.job_properties("syslog_forwarder", None)?;
//!
//! let job = ReleaseDir::new(".").job("syslog_forwarder").await?;
//! let conf = job.render("config/rsyslog.conf", &overrides, Links::new(), Identity::synthetic())?;
//! print!("{conf}");
//! # Ok(())
//! # }
//! ```

// Inputs
pub mod config;
pub mod links;
pub mod manifest;
pub mod release;

// Property model and rendering
pub mod properties;
pub mod templating;
pub mod validation;

// Supporting modules
pub mod cli;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
