//! Custom Tera filters and functions for job templates.
//!
//! - `enum_value(path, allowed, default)` or `enum_value(rule)`: validates an
//!   enumerated property
//! - `confine_paths(base)`: keeps only file names that stay inside `base`
//! - `shell_escape`: quotes a value for a POSIX shell when needed
//! - `p(name, default)`: looks a dotted property name up in the resolved tree
//!
//! Filters that fail with a typed error wrap it with [`tera::Error::chain`]
//! so the renderer can recover the original error from Tera's error chain.
//!
//! ```text
//! {% set format = properties.syslog.migration.message_format | enum_value(rule="message_format") %}
//! {% set transport = properties.syslog.transport
//!        | enum_value(path="syslog.transport", allowed=["tcp", "udp", "relp"], default="tcp") %}
//! {% for file in properties.syslog.migration.cleanup_conf_files | confine_paths(base="/etc/rsyslog.d") %}
//! rm -f {{ file | shell_escape }}
//! {% endfor %}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tera::Value;

use crate::properties::{PropertyValue, ResolvedProperties, UnknownPropertyError};
use crate::utils::path_validation::sanitize_cleanup_paths;
use crate::validation::{EnumRule, validate_enum};

fn string_arg<'a>(
    args: &'a HashMap<String, Value>,
    filter: &str,
    name: &str,
) -> tera::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("{filter} requires a string `{name}` argument")))
}

/// `allowed` may be an array of strings or a comma separated string.
fn allowed_arg(args: &HashMap<String, Value>) -> tera::Result<Vec<String>> {
    match args.get("allowed") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    tera::Error::msg("enum_value `allowed` entries must be strings")
                })
            })
            .collect(),
        Some(Value::String(list)) => {
            Ok(list.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        }
        _ => Err(tera::Error::msg("enum_value requires an `allowed` argument")),
    }
}

fn inline_rule(args: &HashMap<String, Value>) -> tera::Result<EnumRule> {
    Ok(EnumRule {
        path: string_arg(args, "enum_value", "path")?.to_string(),
        allowed: allowed_arg(args)?,
        default: string_arg(args, "enum_value", "default")?.to_string(),
    })
}

/// Creates the `enum_value` filter.
///
/// The rule comes either from `rule=<name>`, looked up in `rules`, or from
/// inline `path`, `allowed` and `default` arguments. The filtered value is
/// the raw property. A `null` value yields the default; a value outside the
/// allowed set fails the render with a
/// [`crate::validation::ConfigValidationError`].
pub fn create_enum_filter(rules: BTreeMap<String, EnumRule>) -> impl tera::Filter + 'static {
    move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
        let rule = match args.get("rule") {
            Some(_) => {
                let name = string_arg(args, "enum_value", "rule")?;
                rules.get(name).cloned().ok_or_else(|| {
                    tera::Error::msg(format!("enum_value: no rule named `{name}`"))
                })?
            }
            None => inline_rule(args)?,
        };

        let property: PropertyValue = serde_json::from_value(value.clone())
            .map_err(|e| tera::Error::msg(format!("enum_value: {e}")))?;

        validate_enum(Some(&property), &rule)
            .map(Value::String)
            .map_err(|err| tera::Error::chain(err.to_string(), err))
    }
}

/// Creates the `confine_paths` filter.
///
/// Accepts `null`, a single string or a list. Non-string list entries are
/// dropped with a warning. Returns the kept entries as absolute paths under
/// `base`; rejections never fail the render.
pub fn create_confine_paths_filter() -> impl tera::Filter + 'static {
    |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
        let base = string_arg(args, "confine_paths", "base")?;

        let requested: Vec<&str> = match value {
            Value::Null => Vec::new(),
            Value::String(entry) => vec![entry.as_str()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| {
                    let entry = item.as_str();
                    if entry.is_none() {
                        tracing::warn!("Skipping non-string cleanup entry: {}", item);
                    }
                    entry
                })
                .collect(),
            other => {
                tracing::warn!("Ignoring cleanup list that is not a list: {}", other);
                Vec::new()
            }
        };

        let kept = sanitize_cleanup_paths(Path::new(base), &requested);
        Ok(Value::Array(
            kept.into_iter().map(|path| Value::String(path.to_string_lossy().into_owned())).collect(),
        ))
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_./-+:@%,=".contains(c)
}

/// Quotes `value` for a POSIX shell. Values made only of safe characters
/// are returned unchanged.
///
/// ```
/// use jobrender::templating::filters::shell_quote;
///
/// assert_eq!(shell_quote("/etc/rsyslog.d/00-default.conf"), "/etc/rsyslog.d/00-default.conf");
/// assert_eq!(shell_quote("a b"), "'a b'");
/// assert_eq!(shell_quote("it's"), r"'it'\''s'");
/// ```
#[must_use]
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Creates the `shell_escape` filter.
pub fn create_shell_escape_filter() -> impl tera::Filter + 'static {
    |value: &Value, _args: &HashMap<String, Value>| -> tera::Result<Value> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(Value::String(shell_quote(&text)))
    }
}

/// Creates the `p` function bound to one render's resolved properties.
///
/// A property that is present is returned as is, including `null`. A
/// missing property returns `default` when given and otherwise fails with
/// [`UnknownPropertyError`].
pub fn create_property_function(properties: ResolvedProperties) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let name = string_arg(args, "p", "name")?;

        if let Some(value) = properties.get(name) {
            return Ok(value.to_json());
        }
        if let Some(default) = args.get("default") {
            return Ok(default.clone());
        }

        let err = UnknownPropertyError {
            name: name.to_string(),
        };
        Err(tera::Error::chain(err.to_string(), err))
    }
}
