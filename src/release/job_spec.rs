//! Job spec parsing.
//!
//! A job spec is the YAML file at `jobs/<job>/spec`:
//!
//! ```yaml
//! name: syslog_forwarder
//! templates:
//!   rsyslog.conf.tera: config/rsyslog.conf
//! consumes:
//!   - name: syslog_storer
//!     type: syslog_storer
//!     optional: true
//! properties:
//!   syslog.port:
//!     description: Port of the syslog drain
//!     default: 514
//! ```
//!
//! Declaration order of templates and properties is preserved.

use serde::{Deserialize, Serialize};

use crate::core::JobRenderError;
use crate::properties::{PropertyDefinition, PropertySchema, PropertyValue};

/// A link the job consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedLink {
    pub name: String,
    #[serde(rename = "type")]
    pub link_type: String,
    #[serde(default)]
    pub optional: bool,
}

/// A template declared by the job: source file name and rendered destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDeclaration {
    /// File name under `templates/`
    pub source: String,
    /// Path the rendered output is installed at, relative to the job directory
    pub destination: String,
}

/// Parsed job spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSpec {
    pub name: String,
    pub templates: Vec<TemplateDeclaration>,
    pub consumes: Vec<ConsumedLink>,
    pub properties: PropertySchema,
}

#[derive(Deserialize)]
struct RawJobSpec {
    name: String,
    #[serde(default)]
    templates: serde_yaml::Mapping,
    #[serde(default)]
    consumes: Vec<ConsumedLink>,
    #[serde(default)]
    properties: serde_yaml::Mapping,
}

#[derive(Deserialize, Default)]
struct RawPropertyDefinition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default: Option<PropertyValue>,
}

fn key_string(key: &serde_yaml::Value, section: &str) -> Result<String, String> {
    key.as_str().map(str::to_string).ok_or_else(|| format!("{section} keys must be strings"))
}

impl JobSpec {
    /// Parses spec YAML. `file` is used in error messages.
    pub fn parse(content: &str, file: &str) -> Result<Self, JobRenderError> {
        let parse_error = |reason: String| JobRenderError::SchemaParse {
            file: file.to_string(),
            reason,
        };

        let raw: RawJobSpec =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        let templates = raw
            .templates
            .iter()
            .map(|(source, destination)| {
                let source = key_string(source, "templates")?;
                let destination = destination
                    .as_str()
                    .ok_or_else(|| format!("template '{source}' must map to a destination path"))?
                    .to_string();
                Ok(TemplateDeclaration {
                    source,
                    destination,
                })
            })
            .collect::<Result<Vec<_>, String>>()
            .map_err(parse_error)?;

        let properties = raw
            .properties
            .into_iter()
            .map(|(name, definition)| {
                let name = key_string(&name, "properties")?;
                let raw_definition: RawPropertyDefinition = if definition.is_null() {
                    RawPropertyDefinition::default()
                } else {
                    serde_yaml::from_value(definition)
                        .map_err(|e| format!("property '{name}': {e}"))?
                };
                Ok(PropertyDefinition {
                    name,
                    description: raw_definition.description,
                    default: raw_definition.default,
                })
            })
            .collect::<Result<PropertySchema, String>>()
            .map_err(parse_error)?;

        Ok(Self {
            name: raw.name,
            templates,
            consumes: raw.consumes,
            properties,
        })
    }

    /// Consumed links that must be supplied.
    pub fn required_links(&self) -> impl Iterator<Item = &ConsumedLink> {
        self.consumes.iter().filter(|link| !link.optional)
    }
}
