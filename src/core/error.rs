//! Error handling for jobrender
//!
//! This module provides the error types and user-friendly error reporting for
//! the renderer. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can decide whether a failure aborts a
//!    whole batch render or only one template
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Lookup errors**: [`JobRenderError::MissingJob`], [`JobRenderError::MissingSchema`],
//!   [`JobRenderError::MissingTemplate`], [`JobRenderError::MissingLink`]. These are wiring
//!   mistakes between a manifest and the job catalog and are never retried.
//! - **Input errors**: [`JobRenderError::SchemaParse`], [`JobRenderError::ManifestParse`],
//!   [`JobRenderError::LinksParse`], [`JobRenderError::ConfigError`]
//! - **Render errors**: [`JobRenderError::Template`], which wraps a
//!   [`TemplateError`]. Invalid enum values surface here with the message
//!   `unknown <property.path>: <value>`.
//!
//! Rejected cleanup paths are not errors at all; see
//! [`crate::utils::path_validation::sanitize_cleanup_paths`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use jobrender::core::{JobRenderError, user_friendly_error};
//!
//! let error = JobRenderError::MissingJob {
//!     job: "syslog_forwarder".to_string(),
//!     instance_group: None,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// The main error type for jobrender operations.
#[derive(Error, Debug)]
pub enum JobRenderError {
    /// The named job is not part of the instance group's job list.
    #[error("{}", missing_job_message(job, instance_group.as_deref()))]
    MissingJob {
        /// Job that was requested
        job: String,
        /// Instance group that was searched, `None` for the first group
        instance_group: Option<String>,
    },

    /// The job's property schema (its `spec` file) could not be located.
    #[error("Job spec for '{job}' not found at {path}")]
    MissingSchema {
        /// Job whose spec is missing
        job: String,
        /// Path where the spec was expected
        path: String,
    },

    /// The job does not declare a template with this destination.
    #[error("Template '{template}' not found in job '{job}'")]
    MissingTemplate {
        /// Job that was searched
        job: String,
        /// Destination path (or source file) of the template
        template: String,
    },

    /// A consumed link marked as required was not supplied.
    #[error("Job '{job}' consumes required link '{link}' but it was not provided")]
    MissingLink {
        /// Consuming job
        job: String,
        /// Link name declared in the job spec
        link: String,
    },

    /// The job spec file is not valid YAML or has the wrong shape.
    #[error("Invalid job spec in {file}: {reason}")]
    SchemaParse {
        /// Path to the spec file
        file: String,
        /// Parser message
        reason: String,
    },

    /// The deployment manifest is not valid YAML or has the wrong shape.
    #[error("Invalid deployment manifest {file}: {reason}")]
    ManifestParse {
        /// Manifest path, or `<inline>` for in-memory documents
        file: String,
        /// Parser message
        reason: String,
    },

    /// The links document is not valid YAML or is not keyed by link name.
    #[error("Invalid links document {file}: {reason}")]
    LinksParse {
        /// Links path, or `<inline>` for in-memory documents
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Template rendering failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn missing_job_message(job: &str, instance_group: Option<&str>) -> String {
    match instance_group {
        Some(group) => format!("Job '{job}' not found in instance group '{group}'"),
        None => format!("Job '{job}' not found in the first instance group"),
    }
}

impl Clone for JobRenderError {
    fn clone(&self) -> Self {
        match self {
            Self::MissingJob {
                job,
                instance_group,
            } => Self::MissingJob {
                job: job.clone(),
                instance_group: instance_group.clone(),
            },
            Self::MissingSchema {
                job,
                path,
            } => Self::MissingSchema {
                job: job.clone(),
                path: path.clone(),
            },
            Self::MissingTemplate {
                job,
                template,
            } => Self::MissingTemplate {
                job: job.clone(),
                template: template.clone(),
            },
            Self::MissingLink {
                job,
                link,
            } => Self::MissingLink {
                job: job.clone(),
                link: link.clone(),
            },
            Self::SchemaParse {
                file,
                reason,
            } => Self::SchemaParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ManifestParse {
                file,
                reason,
            } => Self::ManifestParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::LinksParse {
                file,
                reason,
            } => Self::LinksParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::Template(e) => Self::Template(e.clone()),
            // io::Error is not Clone, keep its message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// ```rust,no_run
/// use jobrender::core::{ErrorContext, JobRenderError};
///
/// let context = ErrorContext::new(JobRenderError::MissingSchema {
///     job: "syslog_forwarder".to_string(),
///     path: "jobs/syslog_forwarder/spec".to_string(),
/// })
/// .with_suggestion("Point --release at the release root");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: JobRenderError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: JobRenderError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining why the error occurred.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with suggestions.
///
/// Recognizes [`JobRenderError`] (including template and validation failures),
/// [`std::io::Error`] and [`toml::de::Error`]; anything else is shown with its
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(render_error) = error.downcast_ref::<JobRenderError>() {
        return create_error_context(render_error.clone());
    }

    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        return create_error_context(JobRenderError::Template(template_error.clone()));
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(JobRenderError::Other {
                message: error_with_chain(&error),
            })
            .with_suggestion("Check that the file or directory exists and the path is correct");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(JobRenderError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your jobrender config file");
    }

    ErrorContext::new(JobRenderError::Other {
        message: error_with_chain(&error),
    })
}

fn error_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: JobRenderError) -> ErrorContext {
    match &error {
        JobRenderError::MissingJob {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(
                "Check the job name and the instance_groups[].jobs[] entries in the manifest, \
                 or pass --instance-group to search a different group",
            )
            .with_details("Without --instance-group only the first instance group is searched"),
        JobRenderError::MissingSchema {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Point --release (or release_dir in the config) at the release root"),
        JobRenderError::MissingTemplate {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use the destination path from the job spec's templates section"),
        JobRenderError::MissingLink {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Supply the link with --links or mark it optional in the job spec"),
        JobRenderError::LinksParse {
            ..
        } => ErrorContext::new(error).with_details(
            "Links are a mapping keyed by link name: \
             <name>: { instances: [{ address: ... }], properties: { ... } }",
        ),
        JobRenderError::Template(TemplateError::ConfigValidation(validation)) => {
            let suggestion = validation.suggestion();
            let ctx = ErrorContext::new(error.clone())
                .with_details(format!("Allowed values: {}", validation.allowed.join(", ")));
            match suggestion {
                Some(closest) => ctx.with_suggestion(format!("Did you mean '{closest}'?")),
                None => ctx,
            }
        }
        JobRenderError::Template(template_error) => {
            let details = template_error.format_with_context();
            ErrorContext::new(error.clone()).with_details(details)
        }
        _ => ErrorContext::new(error),
    }
}
