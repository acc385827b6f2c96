//! User configuration for jobrender.
//!
//! Settings that would otherwise be repeated on every invocation live in
//! `~/.jobrender/config.toml` (`%LOCALAPPDATA%\jobrender\config.toml` on
//! Windows). The location can be overridden with the `JOBRENDER_CONFIG_PATH`
//! environment variable or the `--config` flag. A missing file means
//! defaults.
//!
//! ```toml
//! # Release root containing jobs/<job>/spec
//! release_dir = "~/workspace/syslog-release"
//!
//! # Identity used when --index/--id are not given
//! [identity]
//! index = 0
//! id = "5f0c8e1a-4b5d-4b55-b9a2-6c3d1f2e7a90"
//! ```
//!
//! Command-line flags always take precedence over values from this file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::CONFIG_PATH_ENV;
use crate::templating::Identity;

/// Identity override from the config file; unset fields keep the synthetic values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Release root. `~` and environment variables are expanded on use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_dir: Option<String>,

    #[serde(default)]
    pub identity: IdentityConfig,
}

impl RenderConfig {
    /// Load configuration from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A file that does not exist yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the configuration file.
    ///
    /// `$JOBRENDER_CONFIG_PATH` wins when set and non-empty.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("jobrender")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".jobrender")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The configured release root with `~` and `$VARS` expanded.
    pub fn release_dir(&self) -> Result<Option<PathBuf>> {
        self.release_dir
            .as_deref()
            .map(|raw| {
                shellexpand::full(raw)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .with_context(|| format!("Failed to expand release_dir '{raw}'"))
            })
            .transpose()
    }

    /// The identity to render with, after applying command-line overrides.
    #[must_use]
    pub fn identity(&self, index: Option<u64>, id: Option<&str>) -> Identity {
        let synthetic = Identity::synthetic();
        Identity::new(
            index.or(self.identity.index).unwrap_or(synthetic.index),
            id.map(str::to_string).or_else(|| self.identity.id.clone()).unwrap_or(synthetic.id),
        )
    }
}
