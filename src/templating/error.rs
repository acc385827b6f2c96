//! Structured errors for template rendering.
//!
//! Tera reports every failure as a chain of messages. The renderer converts
//! that chain into a [`TemplateError`] so callers can tell an invalid
//! property value apart from a typo in a template.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::properties::UnknownPropertyError;
use crate::validation::ConfigValidationError;

/// Template rendering failures.
#[derive(Debug, Clone)]
pub enum TemplateError {
    /// An enumerated property holds a value outside its allowed set.
    ConfigValidation(ConfigValidationError),

    /// `p()` was asked for a property that does not exist and has no default.
    UnknownProperty {
        error: UnknownPropertyError,
        location: Box<ErrorLocation>,
    },

    VariableNotFound {
        variable: String,
        available_variables: Box<Vec<String>>,
        suggestions: Box<Vec<String>>,
        location: Box<ErrorLocation>,
    },

    SyntaxError {
        message: String,
        location: Box<ErrorLocation>,
    },

    /// The render context could not be converted for the template engine.
    Context {
        message: String,
    },
}

/// Where a template error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorLocation {
    /// Job that owns the template
    pub job_name: String,
    /// Destination path of the template, e.g. `config/rsyslog.conf`
    pub template: String,
    /// Source file if known
    pub file_path: Option<PathBuf>,
    /// Line number if available from Tera
    pub line_number: Option<usize>,
    /// Surrounding lines as `(line number, text)`
    pub context_lines: Option<Vec<(usize, String)>>,
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::ConfigValidation(err) => write!(f, "{err}"),
            TemplateError::UnknownProperty {
                error,
                ..
            } => write!(f, "{error}"),
            TemplateError::VariableNotFound {
                variable,
                ..
            } => {
                write!(f, "Template variable not found: '{}'", variable)
            }
            TemplateError::SyntaxError {
                message,
                ..
            } => {
                write!(f, "Template syntax error: {}", message)
            }
            TemplateError::Context {
                message,
            } => write!(f, "Failed to build template context: {message}"),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::ConfigValidation(err) => Some(err),
            TemplateError::UnknownProperty {
                error,
                ..
            } => Some(error),
            _ => None,
        }
    }
}

impl TemplateError {
    /// Generate a multi-line report with location, surrounding lines and hints.
    pub fn format_with_context(&self) -> String {
        match self {
            TemplateError::ConfigValidation(err) => format!(
                "Property: {}\nValue: {}\nAllowed: {}\n",
                err.path,
                err.value,
                err.allowed.join(", ")
            ),
            TemplateError::UnknownProperty {
                error,
                location,
            } => format_unknown_property_error(&error.name, location),
            TemplateError::VariableNotFound {
                variable,
                available_variables,
                suggestions,
                location,
            } => format_variable_not_found_error(
                variable,
                available_variables,
                suggestions,
                location,
            ),
            TemplateError::SyntaxError {
                message,
                location,
            } => format_syntax_error(message, location),
            TemplateError::Context {
                message,
            } => message.clone(),
        }
    }
}

fn push_location(msg: &mut String, location: &ErrorLocation) {
    let _ = writeln!(msg, "Template: {} (job {})", location.template, location.job_name);
    if let Some(path) = &location.file_path {
        let _ = writeln!(msg, "File: {}", path.display());
    }
    if let Some(line) = location.line_number {
        let _ = writeln!(msg, "Line: {}", line);
    }
    if let Some(lines) = &location.context_lines {
        msg.push('\n');
        for (number, text) in lines {
            let marker = if Some(*number) == location.line_number {
                ">"
            } else {
                " "
            };
            let _ = writeln!(msg, "{marker} {number:4} | {text}");
        }
    }
}

fn format_unknown_property_error(name: &str, location: &ErrorLocation) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "Property: {name}");
    push_location(&mut msg, location);
    msg.push_str(
        "\nDeclare the property in the job spec or pass a default: p(name=\"...\", default=...)\n",
    );
    msg
}

fn format_variable_not_found_error(
    variable: &str,
    available_variables: &[String],
    suggestions: &[String],
    location: &ErrorLocation,
) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "Variable: {variable}");
    push_location(&mut msg, location);

    if !suggestions.is_empty() {
        msg.push_str("\nDid you mean one of these?\n");
        for suggestion in suggestions {
            let _ = writeln!(msg, "  - {suggestion}");
        }
    }

    if !available_variables.is_empty() {
        msg.push_str("\nAvailable variables in this context:\n");
        for var in available_variables.iter().take(10) {
            let _ = writeln!(msg, "  {var}");
        }
        if available_variables.len() > 10 {
            let _ = writeln!(msg, "  ... and {} more", available_variables.len() - 10);
        }
    }

    msg
}

fn format_syntax_error(message: &str, location: &ErrorLocation) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "Error: {message}");
    push_location(&mut msg, location);
    msg.push_str("\nCommon issues:\n");
    msg.push_str("  - Unclosed {{ }} or {% %} delimiters\n");
    msg.push_str("  - Unknown filter or function names\n");
    msg.push_str("  - Filter arguments must be named, e.g. confine_paths(base=\"/etc\")\n");
    msg
}
