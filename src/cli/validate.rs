//! Render every template of one job (or of every job in the release) and
//! report which ones fail.
//!
//! Nothing is written to disk. The command exits non-zero when any template
//! fails, so it can gate CI:
//!
//! ```bash
//! jobrender validate syslog_forwarder --manifest manifest.yml
//! jobrender validate --format json
//! ```

use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::common::{LoadedInputs, RenderInputs};
use crate::config::RenderConfig;
use crate::core::JobRenderError;
use crate::templating::TemplateError;

/// Output format for validation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Text,
    /// Structured JSON output for automation
    Json,
}

/// Render all templates without writing them.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Job to validate; every job in the release when omitted
    pub job: Option<String>,

    #[command(flatten)]
    pub inputs: RenderInputs,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Outcome for one template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateResult {
    pub job: String,
    pub template: String,
    pub rendered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Aggregated results, the JSON output shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResults {
    pub valid: bool,
    pub templates_rendered: usize,
    pub templates_total: usize,
    pub results: Vec<TemplateResult>,
}

impl ValidationResults {
    fn push(&mut self, result: TemplateResult) {
        self.templates_total += 1;
        if result.rendered {
            self.templates_rendered += 1;
        }
        self.results.push(result);
    }

    fn finish(mut self) -> Self {
        self.valid = self.templates_rendered == self.templates_total;
        self
    }
}

fn failure(job: &str, template: &str, error: &JobRenderError) -> TemplateResult {
    let suggestion = match error {
        JobRenderError::Template(TemplateError::ConfigValidation(validation)) => {
            validation.suggestion().map(|closest| format!("did you mean '{closest}'?"))
        }
        _ => None,
    };
    TemplateResult {
        job: job.to_string(),
        template: template.to_string(),
        rendered: false,
        error: Some(error.to_string()),
        suggestion,
    }
}

impl ValidateCommand {
    pub async fn execute(self, config: &RenderConfig) -> Result<()> {
        let loaded = self.inputs.load(config).await?;
        let jobs = match &self.job {
            Some(job) => vec![job.clone()],
            None => loaded.release.job_names().await?,
        };

        let mut results = ValidationResults::default();
        for job in &jobs {
            self.validate_job(&loaded, job, &mut results).await?;
        }
        let results = results.finish();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => print_text(&results),
        }

        if results.valid {
            Ok(())
        } else {
            Err(anyhow!(
                "{} of {} template(s) failed to render",
                results.templates_total - results.templates_rendered,
                results.templates_total
            ))
        }
    }

    async fn validate_job(
        &self,
        loaded: &LoadedInputs,
        job_name: &str,
        results: &mut ValidationResults,
    ) -> Result<()> {
        let job = loaded.release.job(job_name).await?;

        // When validating the whole release, jobs missing from the manifest
        // are checked against their defaults.
        let overrides = match loaded.overrides(job_name, self.inputs.instance_group.as_deref()) {
            Ok(overrides) => overrides,
            Err(JobRenderError::MissingJob {
                ..
            }) if self.job.is_none() => {
                tracing::debug!("Job {} not in manifest, validating defaults", job_name);
                crate::properties::PropertyValue::empty_mapping()
            }
            Err(e) => return Err(e.into()),
        };

        let context = match loaded.render_context(&job, &overrides) {
            Ok(context) => context,
            Err(e) => {
                let error = match e.downcast::<JobRenderError>() {
                    Ok(render_error) => render_error,
                    Err(other) => return Err(other),
                };
                for template in job.templates() {
                    results.push(failure(job_name, &template.destination, &error));
                }
                return Ok(());
            }
        };

        for template in job.templates() {
            let result = match job.render_context(&template.destination, &context) {
                Ok(_) => TemplateResult {
                    job: job_name.to_string(),
                    template: template.destination.clone(),
                    rendered: true,
                    error: None,
                    suggestion: None,
                },
                Err(e) => failure(job_name, &template.destination, &e),
            };
            results.push(result);
        }
        Ok(())
    }
}

fn print_text(results: &ValidationResults) {
    for result in &results.results {
        let name = format!("{}/{}", result.job, result.template);
        if result.rendered {
            println!("{} {}", "✓".green(), name);
        } else {
            println!("{} {}: {}", "✗".red(), name, result.error.as_deref().unwrap_or_default());
            if let Some(suggestion) = &result.suggestion {
                println!("  {} {}", "hint:".yellow(), suggestion);
            }
        }
    }

    let summary = format!(
        "{}/{} template(s) rendered",
        results.templates_rendered, results.templates_total
    );
    if results.valid {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}
