//! Hierarchical entity identifiers built by the `Key(...)` cast.

use std::fmt;

use serde::Serialize;

use crate::value::Value;

/// The id half of a key path element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KeyId {
    Id(i64),
    Name(String),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "{}", id),
            KeyId::Name(name) => write!(f, "'{}'", name.replace('\'', "''")),
        }
    }
}

/// One `(kind, id-or-name)` step of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathElement {
    pub kind: String,
    pub id: KeyId,
}

/// Entity key: a namespace plus a non-empty path from root to entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub path: Vec<PathElement>,
}

impl Key {
    /// Builds a key from a flat `kind, id, kind, id, ...` argument list.
    ///
    /// # Examples
    ///
    /// ```
    /// use gql_lang::{Key, Value};
    ///
    /// let key = Key::from_flat(
    ///     &[
    ///         Value::String("parent".into()),
    ///         Value::String("c".into()),
    ///         Value::String("child".into()),
    ///         Value::Integer(42),
    ///     ],
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(key.to_string(), "Key('parent', 'c', 'child', 42)");
    /// ```
    pub fn from_flat(values: &[Value], namespace: Option<&str>) -> Result<Self, String> {
        if values.is_empty() || values.len() % 2 != 0 {
            return Err(format!(
                "Function key requires an even number of arguments; received {}",
                values.len()
            ));
        }

        let mut path = Vec::with_capacity(values.len() / 2);
        for pair in values.chunks(2) {
            let kind = match &pair[0] {
                Value::String(kind) if !kind.is_empty() => kind.clone(),
                other => return Err(format!("Key kind must be a non-empty string; received {}", other)),
            };
            let id = match &pair[1] {
                Value::Integer(id) if *id > 0 => KeyId::Id(*id),
                Value::String(name) if !name.is_empty() => KeyId::Name(name.clone()),
                other => {
                    return Err(format!(
                        "Key id must be a positive integer or a non-empty string; received {}",
                        other
                    ));
                }
            };
            path.push(PathElement { kind, id });
        }

        Ok(Key {
            namespace: namespace.map(str::to_string),
            path,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(")?;
        for (i, element) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}', {}", element.kind.replace('\'', "''"), element.id)?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, ", namespace='{}'", ns)?;
        }
        f.write_str(")")
    }
}
