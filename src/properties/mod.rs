//! Typed property trees.
//!
//! Job defaults and manifest overrides are both represented as
//! [`PropertyValue`] trees. Dotted property names such as
//! `syslog.migration.message_format` address nested mappings.
//!
//! Lookups distinguish three states explicitly:
//! - `None`: the key is absent
//! - `Some(PropertyValue::Null)`: the key is present with a null value
//! - `Some(other)`: the key is present, possibly falsy or empty
//!
//! The merge of defaults and overrides lives in [`merge`].

pub mod merge;
pub mod schema;

pub use merge::merge;
pub use schema::{PropertyDefinition, PropertySchema};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping node of a property tree.
///
/// A `BTreeMap` keeps iteration order stable so that two renders of the same
/// inputs produce byte-identical output.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// One node of a property tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    /// Explicit `null` (or `~` in YAML)
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Integer(i64),
    /// Floating point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Sequence of values
    Sequence(Vec<PropertyValue>),
    /// Nested mapping
    Mapping(PropertyMap),
}

impl PropertyValue {
    /// An empty mapping.
    #[must_use]
    pub fn empty_mapping() -> Self {
        Self::Mapping(PropertyMap::new())
    }

    /// Returns `true` for [`PropertyValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string slice of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The inner mapping, if this value is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&PropertyMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a dotted path.
    ///
    /// Every segment but the last must resolve to a mapping. An empty path
    /// returns `self`.
    ///
    /// ```
    /// use jobrender::properties::PropertyValue;
    ///
    /// let tree = PropertyValue::from(
    ///     serde_yaml::from_str::<serde_yaml::Value>("syslog: { port: ~ }").unwrap(),
    /// );
    /// assert_eq!(tree.lookup("syslog.port"), Some(&PropertyValue::Null));
    /// assert_eq!(tree.lookup("syslog.address"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, dotted: &str) -> Option<&PropertyValue> {
        if dotted.is_empty() {
            return Some(self);
        }
        dotted.split('.').try_fold(self, |node, segment| node.as_mapping()?.get(segment))
    }

    /// Converts the tree into a JSON value, the form the template engine consumes.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other).map(|s| s.trim_end().to_string()).unwrap_or_default(),
    }
}

impl From<serde_yaml::Value> for PropertyValue {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    // u64 beyond i64::MAX
                    Self::String(n.to_string())
                }
            }
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Self::Mapping(
                map.into_iter().map(|(k, v)| (yaml_key_to_string(k), Self::from(v))).collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        Self::Mapping(value)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_yaml::Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(map) => serializer.collect_map(map),
        }
    }
}

impl fmt::Display for PropertyValue {
    /// Scalars print literally (`crazy-format`, `514`, `true`); compound
    /// values print as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Sequence(_) | Self::Mapping(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Properties after job defaults have been merged with manifest overrides.
///
/// Every property declared by the job schema is present; undeclared manifest
/// properties are carried along unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedProperties(PropertyMap);

impl ResolvedProperties {
    /// Wraps an already merged mapping.
    #[must_use]
    pub const fn new(map: PropertyMap) -> Self {
        Self(map)
    }

    /// Looks up a dotted property path.
    #[must_use]
    pub fn get(&self, dotted: &str) -> Option<&PropertyValue> {
        let (head, rest) = match dotted.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (dotted, None),
        };
        let node = self.0.get(head)?;
        match rest {
            Some(rest) => node.lookup(rest),
            None => Some(node),
        }
    }

    /// The underlying mapping.
    #[must_use]
    pub const fn as_map(&self) -> &PropertyMap {
        &self.0
    }

    /// Converts into a JSON object for the template engine.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

/// A template asked for a property that is neither resolved nor defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Can't find property '{name}'")]
pub struct UnknownPropertyError {
    /// Dotted property name
    pub name: String,
}
