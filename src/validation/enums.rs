//! Enumerated property values.
//!
//! Validation runs when a template interprets a property, not during the
//! merge: the same resolved tree can serve templates that read one raw value
//! in different ways.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use strsim::levenshtein;

use crate::properties::PropertyValue;

/// Allowed values for one enumerated property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRule {
    /// Fully qualified property path used in error messages
    pub path: String,
    /// Accepted literals
    pub allowed: Vec<String>,
    /// Value substituted when the property is absent or null
    pub default: String,
}

impl EnumRule {
    /// Creates a rule from string slices.
    pub fn new(path: impl Into<String>, allowed: &[&str], default: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
            default: default.into(),
        }
    }
}

/// A property holds a value outside its allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {path}: {value}")]
pub struct ConfigValidationError {
    /// Fully qualified property path
    pub path: String,
    /// Offending value as written in the manifest
    pub value: String,
    /// Values that would have been accepted
    pub allowed: Vec<String>,
}

impl ConfigValidationError {
    /// The allowed value closest to the offending one, if any is reasonably close.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        let threshold = (self.value.len() / 2).max(1);
        self.allowed
            .iter()
            .map(|candidate| (candidate, levenshtein(&self.value, candidate)))
            .filter(|(_, distance)| *distance <= threshold)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate.as_str())
    }
}

/// Validates `value` against `rule`.
///
/// Absent and null values resolve to the rule's default. Strings must be
/// members of the allowed set; any other value is rejected with its literal
/// form in the message.
///
/// ```
/// use jobrender::properties::PropertyValue;
/// use jobrender::validation::{validate_enum, MessageFormat};
///
/// let rule = MessageFormat::rule();
/// assert_eq!(validate_enum(None, &rule).unwrap(), "rfc5424");
///
/// let err = validate_enum(Some(&PropertyValue::from("crazy-format")), &rule).unwrap_err();
/// assert_eq!(err.to_string(), "unknown syslog.migration.message_format: crazy-format");
/// ```
pub fn validate_enum(
    value: Option<&PropertyValue>,
    rule: &EnumRule,
) -> Result<String, ConfigValidationError> {
    let candidate = match value {
        None | Some(PropertyValue::Null) => return Ok(rule.default.clone()),
        Some(PropertyValue::String(s)) => s.as_str(),
        Some(other) => {
            return Err(ConfigValidationError {
                path: rule.path.clone(),
                value: other.to_string(),
                allowed: rule.allowed.clone(),
            });
        }
    };

    if rule.allowed.iter().any(|allowed| allowed == candidate) {
        Ok(candidate.to_string())
    } else {
        Err(ConfigValidationError {
            path: rule.path.clone(),
            value: candidate.to_string(),
            allowed: rule.allowed.clone(),
        })
    }
}

/// Message format written by the forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// RFC 5424 with instance structured data
    #[default]
    Rfc5424,
    /// Legacy format tagged with `<job>/<index>`
    JobIndex,
    /// Legacy format tagged with `<job>/<index>/<id>`
    JobIndexId,
}

impl MessageFormat {
    /// Property that selects the format.
    pub const PROPERTY: &'static str = "syslog.migration.message_format";

    /// Name templates use for [`Self::rule`], as in `enum_value(rule="message_format")`.
    pub const RULE_NAME: &'static str = "message_format";

    /// Every format in declaration order.
    pub const ALL: [Self; 3] = [Self::Rfc5424, Self::JobIndex, Self::JobIndexId];

    /// Literal used in manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rfc5424 => "rfc5424",
            Self::JobIndex => "job_index",
            Self::JobIndexId => "job_index_id",
        }
    }

    /// The validation rule for [`Self::PROPERTY`].
    #[must_use]
    pub fn rule() -> EnumRule {
        let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
        EnumRule::new(Self::PROPERTY, &allowed, Self::default().as_str())
    }
}

/// Rules templates can refer to by name instead of spelling out
/// `path`, `allowed` and `default`.
#[must_use]
pub fn named_rules() -> BTreeMap<String, EnumRule> {
    BTreeMap::from([(MessageFormat::RULE_NAME.to_string(), MessageFormat::rule())])
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.as_str() == s).ok_or_else(|| {
            let rule = Self::rule();
            ConfigValidationError {
                path: rule.path,
                value: s.to_string(),
                allowed: rule.allowed,
            }
        })
    }
}
