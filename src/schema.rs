//! Declared property types, as seen by lowering.
//!
//! The entity model itself lives outside this crate. Lowering only asks a
//! [`PropertyResolver`] for a property's semantic type so plain literals
//! can be coerced the way the property stores them.

use std::collections::HashMap;

use serde::Deserialize;

/// Semantic type of a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    #[serde(rename = "time")]
    TimeOfDay,
    #[serde(rename = "geopt")]
    GeoPoint,
    Key,
    #[default]
    Unknown,
}

/// Looks up the declared type of `property` on `kind`.
///
/// `kind` is `None` for kindless queries. Unknown properties resolve to
/// [`PropertyType::Unknown`].
pub trait PropertyResolver {
    fn property_type(&self, kind: Option<&str>, property: &str) -> PropertyType;
}

/// In-memory resolver keyed by kind, then property name.
///
/// # Examples
///
/// ```
/// use gql_lang::{PropertyResolver, PropertyType, Schema};
///
/// let schema = Schema::new().with_kind("SomeKind", [("prop1", PropertyType::Integer)]);
/// assert_eq!(schema.property_type(Some("SomeKind"), "prop1"), PropertyType::Integer);
/// assert_eq!(schema.property_type(Some("SomeKind"), "other"), PropertyType::Unknown);
///
/// let schema: Schema = serde_json::from_str(r#"{"SomeKind": {"prop1": "time"}}"#).unwrap();
/// assert_eq!(schema.property_type(Some("SomeKind"), "prop1"), PropertyType::TimeOfDay);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    kinds: HashMap<String, HashMap<String, PropertyType>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind<I, S>(mut self, kind: &str, properties: I) -> Self
    where
        I: IntoIterator<Item = (S, PropertyType)>,
        S: Into<String>,
    {
        self.kinds
            .entry(kind.to_string())
            .or_default()
            .extend(properties.into_iter().map(|(name, ty)| (name.into(), ty)));
        self
    }
}

impl PropertyResolver for Schema {
    fn property_type(&self, kind: Option<&str>, property: &str) -> PropertyType {
        kind.and_then(|k| self.kinds.get(k))
            .and_then(|props| props.get(property))
            .copied()
            .unwrap_or_default()
    }
}
