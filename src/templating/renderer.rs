//! Template rendering engine with Tera.
//!
//! This module provides the [`TemplateRenderer`] that wraps Tera with the
//! job-specific filters and the `p()` property lookup, and converts Tera
//! errors into [`TemplateError`] values.

use regex::Regex;
use std::error::Error as _;
use std::path::PathBuf;
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};

use super::context::RenderContext;
use super::error::{ErrorLocation, TemplateError};
use super::filters;
use crate::properties::{ResolvedProperties, UnknownPropertyError};
use crate::validation::{ConfigValidationError, named_rules};

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Information about the template being rendered, used in error reports.
#[derive(Debug, Clone, Default)]
pub struct RenderingMetadata {
    /// Job that owns the template
    pub job_name: String,
    /// Destination path of the template
    pub template: String,
    /// Template source file if available
    pub source_path: Option<PathBuf>,
}

/// Template renderer bound to one render context.
///
/// The context is converted once and reused for every template rendered
/// through this renderer. Each call builds a fresh Tera instance, so
/// renders share no mutable state and can run concurrently.
pub struct TemplateRenderer {
    context: TeraContext,
    properties: ResolvedProperties,
}

impl TemplateRenderer {
    /// Create a renderer for `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Context`] if the context cannot be converted
    /// for Tera.
    pub fn new(context: &RenderContext) -> Result<Self, TemplateError> {
        Ok(Self {
            context: context.to_tera_context()?,
            properties: context.properties.clone(),
        })
    }

    fn engine(&self) -> Tera {
        let mut tera = Tera::default();
        tera.register_filter("enum_value", filters::create_enum_filter(named_rules()));
        tera.register_filter("confine_paths", filters::create_confine_paths_filter());
        tera.register_filter("shell_escape", filters::create_shell_escape_filter());
        tera.register_function("p", filters::create_property_function(self.properties.clone()));
        tera
    }

    /// Render template source text.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::ConfigValidation`] when an `enum_value` check fails
    /// - [`TemplateError::UnknownProperty`] when `p()` cannot resolve a name
    /// - [`TemplateError::VariableNotFound`] for undefined context variables
    /// - [`TemplateError::SyntaxError`] for everything else Tera reports
    pub fn render_template(
        &self,
        template_content: &str,
        metadata: Option<&RenderingMetadata>,
    ) -> Result<String, TemplateError> {
        let label = metadata.map_or("<template>", |m| m.template.as_str());
        tracing::debug!("Rendering {} with context", label);
        Self::log_context_as_kv(&self.context);

        let mut tera = self.engine();
        let rendered = tera
            .render_str(template_content, &self.context)
            .map_err(|e| Self::parse_tera_error(&e, template_content, &self.context, metadata))?;

        tracing::debug!("Rendered {} ({} bytes)", label, rendered.len());
        Ok(rendered)
    }

    /// Parse a Tera error into a structured TemplateError
    fn parse_tera_error(
        error: &tera::Error,
        template_content: &str,
        context: &TeraContext,
        metadata: Option<&RenderingMetadata>,
    ) -> TemplateError {
        if let Some(validation) = find_in_chain::<ConfigValidationError>(error) {
            return TemplateError::ConfigValidation(validation.clone());
        }

        let line_number = Self::extract_line_from_tera_error(error);
        let context_lines = line_number
            .map(|line| Self::extract_context_lines(template_content, line, 3))
            .filter(|lines| !lines.is_empty());
        let location = Box::new(Self::build_error_location(metadata, line_number, context_lines));

        if let Some(unknown) = find_in_chain::<UnknownPropertyError>(error) {
            return TemplateError::UnknownProperty {
                error: unknown.clone(),
                location,
            };
        }

        let full_message = chain_messages(error).join(" ");
        if full_message.contains("Variable") && full_message.contains("not found") {
            if let Some(name) = Self::extract_variable_name(&full_message) {
                let available_variables = Self::extract_available_variables(context);
                let suggestions = Self::find_similar_variables(&name, &available_variables);
                return TemplateError::VariableNotFound {
                    variable: name,
                    available_variables: Box::new(available_variables),
                    suggestions: Box::new(suggestions),
                    location,
                };
            }
        }

        TemplateError::SyntaxError {
            message: Self::format_tera_error(error),
            location,
        }
    }

    /// Extract variable name from "Variable `foo` not found" message
    fn extract_variable_name(error_msg: &str) -> Option<String> {
        let re = Regex::new(r"Variable `([^`]+)` not found").ok()?;
        re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
    }

    /// Every dotted path in the context, leaves and intermediate mappings alike.
    fn extract_available_variables(context: &TeraContext) -> Vec<String> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<String>) {
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
            if let serde_json::Value::Object(map) = value {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    walk(&path, child, out);
                }
            }
        }

        let mut vars = Vec::new();
        walk("", &context.clone().into_json(), &mut vars);
        vars
    }

    /// Find similar variable names using Levenshtein distance
    fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
        let mut scored: Vec<_> =
            available.iter().map(|var| (var.clone(), levenshtein(target, var))).collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(var, _)| var)
            .collect()
    }

    /// Up to `context_size` lines either side of `error_line` (1-indexed).
    fn extract_context_lines(
        content: &str,
        error_line: usize,
        context_size: usize,
    ) -> Vec<(usize, String)> {
        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();

        if error_line == 0 || error_line > total_lines {
            return Vec::new();
        }

        let start = error_line.saturating_sub(context_size + 1);
        let end = (error_line + context_size).min(total_lines);

        lines[start..end]
            .iter()
            .enumerate()
            .map(|(idx, line)| (start + idx + 1, (*line).to_string()))
            .collect()
    }

    /// Tera includes `line:column` in parse error messages, e.g. `--> 3:7`.
    fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
        let messages = chain_messages(error).join("\n");
        let re = Regex::new(r"(\d+):(\d+)").ok()?;
        re.captures(&messages)
            .and_then(|caps| caps.get(1))
            .and_then(|line| line.as_str().parse::<usize>().ok())
    }

    fn build_error_location(
        metadata: Option<&RenderingMetadata>,
        line_number: Option<usize>,
        context_lines: Option<Vec<(usize, String)>>,
    ) -> ErrorLocation {
        let meta = metadata.cloned().unwrap_or_else(|| RenderingMetadata {
            job_name: "unknown".to_string(),
            template: "unknown".to_string(),
            source_path: None,
        });

        ErrorLocation {
            job_name: meta.job_name,
            template: meta.template,
            file_path: meta.source_path,
            line_number,
            context_lines,
        }
    }

    /// Format a Tera error chain as one message, dropping Tera's internal
    /// one-off template name.
    pub fn format_tera_error(error: &tera::Error) -> String {
        let messages: Vec<String> = chain_messages(error)
            .into_iter()
            .map(|msg| {
                msg.replace("while rendering '__tera_one_off'", "")
                    .replace("Failed to render '__tera_one_off'", "Template rendering failed")
                    .replace("Failed to parse '__tera_one_off'", "Template syntax error")
                    .replace("'__tera_one_off'", "template")
                    .trim()
                    .to_string()
            })
            .filter(|msg| {
                !msg.is_empty() && msg != "Template rendering failed" && msg != "Template syntax error"
            })
            .collect();

        if messages.is_empty() {
            "Template syntax error (see details above)".to_string()
        } else {
            messages.join("\n  -> ")
        }
    }

    /// Format the template context as indented `key: value` lines.
    fn format_context_as_string(context: &TeraContext) -> String {
        fn format_value(key: &str, value: &serde_json::Value, indent: usize) -> Vec<String> {
            let prefix = "  ".repeat(indent);
            let mut lines = Vec::new();

            match value {
                serde_json::Value::Object(map) => {
                    lines.push(format!("{}{}:", prefix, key));
                    for (k, v) in map {
                        lines.extend(format_value(k, v, indent + 1));
                    }
                }
                serde_json::Value::Array(arr) => {
                    lines.push(format!("{}{}: [{} items]", prefix, key, arr.len()));
                    for (i, item) in arr.iter().take(3).enumerate() {
                        lines.extend(format_value(&format!("[{}]", i), item, indent + 1));
                    }
                    if arr.len() > 3 {
                        lines.push(format!("{}  ... {} more items", prefix, arr.len() - 3));
                    }
                }
                other => lines.push(format!("{}{}: {}", prefix, key, other)),
            }
            lines
        }

        let mut output = String::new();
        if let serde_json::Value::Object(map) = context.clone().into_json() {
            for (key, value) in &map {
                output.push_str(&format_value(key, value, 1).join("\n"));
                output.push('\n');
            }
        }
        output
    }

    fn log_context_as_kv(context: &TeraContext) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        for line in Self::format_context_as_string(context).lines() {
            tracing::debug!("{}", line);
        }
    }
}

/// Messages of `error` and all of its sources, outermost first.
fn chain_messages(error: &tera::Error) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages
}

/// First error of type `T` in the source chain of `error`.
pub(crate) fn find_in_chain<T: std::error::Error + 'static>(error: &tera::Error) -> Option<&T> {
    let mut current = error.source();
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}
