//! Attribute values and per-resource state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProviderError, Result};

/// Attribute value as exchanged with the host engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    /// Numbers are f64, as in Terraform
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    Map(BTreeMap<String, Dynamic>),
}

impl Dynamic {
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral numbers only
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Dynamic::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Dynamic>> {
        match self {
            Dynamic::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
        }
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Dynamic::Number(value as f64)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl<T: Into<Dynamic>> From<Vec<T>> for Dynamic {
    fn from(values: Vec<T>) -> Self {
        Dynamic::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Dynamic>> for Dynamic {
    fn from(value: BTreeMap<String, Dynamic>) -> Self {
        Dynamic::Map(value)
    }
}

/// Flat attribute map plus the resource id.
///
/// An empty id means the resource does not exist remotely; the host engine
/// drops it from state and plans a create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    values: BTreeMap<String, Dynamic>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: BTreeMap<String, Dynamic>) -> Self {
        Self {
            id: String::new(),
            values,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Dynamic::as_str)
    }

    /// Non-empty string attribute, or a validation error naming `key`
    pub fn require_string(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(Dynamic::String(s)) if !s.is_empty() => Ok(s.as_str()),
            Some(other) if !matches!(other, Dynamic::String(_)) => Err(ProviderError::Validation(
                format!("{} must be a string, got {}", key, other.type_name()),
            )),
            _ => Err(ProviderError::Validation(format!("{} is required", key))),
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Dynamic::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Dynamic::as_bool)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Dynamic>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn values(&self) -> &BTreeMap<String, Dynamic> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut BTreeMap<String, Dynamic> {
        &mut self.values
    }
}
