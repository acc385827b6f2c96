//! Property schemas declared by jobs.

use serde::Serialize;

use super::PropertyValue;

/// One property declared in a job spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDefinition {
    /// Dotted property name, e.g. `syslog.migration.message_format`
    pub name: String,
    /// Human readable description from the spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value; `None` when the spec declares no default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
}

/// Ordered set of property definitions for one job.
///
/// Order follows the spec file. The schema is loaded once per job and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PropertySchema {
    definitions: Vec<PropertyDefinition>,
}

impl PropertySchema {
    /// Builds a schema from definitions in declaration order.
    #[must_use]
    pub const fn new(definitions: Vec<PropertyDefinition>) -> Self {
        Self {
            definitions,
        }
    }

    /// Iterates definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter()
    }

    /// Finds a definition by its dotted name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the job declares no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<PropertyDefinition> for PropertySchema {
    fn from_iter<T: IntoIterator<Item = PropertyDefinition>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
