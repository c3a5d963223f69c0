//! Resource schemas: attribute declarations, defaults and validation

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::diagnostic::Diagnostics;
use crate::state::{Dynamic, ResourceData};

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.accepts(item))
            }
            (AttributeType::Object(fields), Dynamic::Map(map)) => map
                .iter()
                .all(|(k, v)| fields.get(k).is_some_and(|t| t.accepts(v))),
            _ => false,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("string"),
            AttributeType::Number => f.write_str("number"),
            AttributeType::Bool => f.write_str("bool"),
            AttributeType::List(elem) => write!(f, "list({})", elem),
            AttributeType::Object(_) => f.write_str("object"),
        }
    }
}

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

/// Integer in `[min, max]`, optionally also accepting -1 as "unlimited"
#[derive(Debug, Clone, Copy)]
pub struct IntRangeValidator {
    pub min: i64,
    pub max: i64,
    pub allow_unlimited: bool,
}

impl IntRangeValidator {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            allow_unlimited: false,
        }
    }

    pub fn or_unlimited(mut self) -> Self {
        self.allow_unlimited = true;
        self
    }

    pub fn accepts(&self, value: i64) -> bool {
        (self.allow_unlimited && value == -1) || (self.min..=self.max).contains(&value)
    }
}

impl Validator for IntRangeValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if value.is_null() {
            return;
        }
        match value.as_i64() {
            Some(n) if self.accepts(n) => {}
            Some(n) => {
                let allowed = if self.allow_unlimited {
                    format!("-1 or [{}, {}]", self.min, self.max)
                } else {
                    format!("[{}, {}]", self.min, self.max)
                };
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must be {}", attribute_path, allowed),
                    format!("Got {}", n),
                );
            }
            None => diagnostics.add_attribute_error(
                attribute_path,
                format!("{} must be an integer", attribute_path),
                format!("Got {}", value.type_name()),
            ),
        }
    }
}

/// String drawn from a fixed set
#[derive(Debug, Clone)]
pub struct AllowedStringsValidator {
    pub values: Vec<String>,
}

impl AllowedStringsValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for AllowedStringsValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.add_attribute_error(
                    attribute_path,
                    format!("{} must be one of {}", attribute_path, self.values.join(", ")),
                    format!("Got '{}'", s),
                );
            }
        }
    }
}

#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub force_new: bool,
    pub default: Option<Dynamic>,
    pub validators: Vec<Arc<dyn Validator>>,
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("force_new", &self.force_new)
            .field("default", &self.default)
            .field("validators", &format!("{} validators", self.validators.len()))
            .finish()
    }
}

pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                force_new: false,
                default: None,
                validators: Vec::new(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, elem: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(elem)))
    }

    pub fn description(mut self, description: &str) -> Self {
        self.attribute.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Changing the value forces a new resource
    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn default(mut self, value: impl Into<Dynamic>) -> Self {
        self.attribute.default = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Fill unset optional attributes with their defaults
    pub fn apply_defaults(&self, data: &mut ResourceData) {
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                if data.get(&attr.name).is_none() {
                    data.set(&attr.name, default.clone());
                }
            }
        }
    }

    /// Check presence, types and validators of the configured values
    pub fn validate(&self, data: &ResourceData) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for (name, value) in data.values() {
            if self.attribute(name).is_none() && !value.is_null() {
                diagnostics.add_attribute_error(
                    name,
                    format!("Unsupported argument {}", name),
                    "An argument with this name is not expected here",
                );
            }
        }

        for attr in &self.attributes {
            let value = match data.get(&attr.name) {
                Some(value) => value,
                None => {
                    if attr.required {
                        diagnostics.add_attribute_error(
                            &attr.name,
                            format!("Missing required argument {}", attr.name),
                            format!("The argument {} is required", attr.name),
                        );
                    }
                    continue;
                }
            };

            if !attr.r#type.accepts(value) {
                diagnostics.add_attribute_error(
                    &attr.name,
                    format!("Incorrect attribute value type for {}", attr.name),
                    format!("Expected {}, got {}", attr.r#type, value.type_name()),
                );
                continue;
            }

            for validator in &attr.validators {
                validator.validate(value, &attr.name, &mut diagnostics);
            }
        }

        diagnostics
    }

    /// Force-new attributes whose value differs between `prior` and `planned`
    pub fn requires_replace(&self, prior: &ResourceData, planned: &ResourceData) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|attr| attr.force_new)
            .filter(|attr| prior.get(&attr.name) != planned.get(&attr.name))
            .map(|attr| attr.name.clone())
            .collect()
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    version: i64,
    description: String,
    attributes: Vec<Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn attribute(mut self, attribute: AttributeBuilder) -> Self {
        self.attributes.push(attribute.build());
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            description: self.description,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(AttributeBuilder::string("usage_plan_name").required())
            .attribute(
                AttributeBuilder::number("max_request_num_pre_sec")
                    .optional()
                    .default(-1i64)
                    .validator(IntRangeValidator::new(1, 2000).or_unlimited()),
            )
            .attribute(
                AttributeBuilder::string("environment")
                    .required()
                    .force_new()
                    .validator(AllowedStringsValidator::new(["test", "prepub", "release"])),
            )
            .attribute(AttributeBuilder::string("create_time").computed())
            .build()
    }

    fn data(pairs: &[(&str, Dynamic)]) -> ResourceData {
        let mut data = ResourceData::new();
        for (k, v) in pairs {
            data.set(k, v.clone());
        }
        data
    }

    #[test]
    fn int_range_with_unlimited_sentinel() {
        let v = IntRangeValidator::new(1, 99999999).or_unlimited();
        assert!(v.accepts(-1));
        assert!(v.accepts(1));
        assert!(v.accepts(99999999));
        assert!(!v.accepts(0));
        assert!(!v.accepts(-2));
        assert!(!v.accepts(100000000));
        assert!(!IntRangeValidator::new(1, 10).accepts(-1));
    }

    #[test]
    fn defaults_fill_missing_values_only() {
        let schema = quota_schema();
        let mut filled = data(&[("usage_plan_name", "p".into())]);
        schema.apply_defaults(&mut filled);
        assert_eq!(filled.get_i64("max_request_num_pre_sec"), Some(-1));

        let mut kept = data(&[("max_request_num_pre_sec", 10i64.into())]);
        schema.apply_defaults(&mut kept);
        assert_eq!(kept.get_i64("max_request_num_pre_sec"), Some(10));
    }

    #[test]
    fn validate_reports_each_problem() {
        let schema = quota_schema();
        let diags = schema.validate(&data(&[
            ("max_request_num_pre_sec", 2001i64.into()),
            ("environment", "prod".into()),
            ("bogus", true.into()),
        ]));

        let summaries: Vec<_> = diags.iter().map(|d| d.summary.clone()).collect();
        assert_eq!(diags.len(), 4, "{:?}", summaries);
        assert!(summaries.iter().any(|s| s.contains("Missing required argument usage_plan_name")));
        assert!(summaries.iter().any(|s| s.contains("-1 or [1, 2000]")));
        assert!(summaries.iter().any(|s| s.contains("test, prepub, release")));
        assert!(summaries.iter().any(|s| s.contains("Unsupported argument bogus")));
    }

    #[test]
    fn validate_rejects_wrong_types() {
        let schema = quota_schema();
        let diags = schema.validate(&data(&[
            ("usage_plan_name", 5i64.into()),
            ("environment", "test".into()),
        ]));
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().all(|d| d.detail == "Expected string, got number"));
    }

    #[test]
    fn requires_replace_lists_changed_force_new_attributes() {
        let schema = quota_schema();
        let prior = data(&[("environment", "test".into()), ("usage_plan_name", "a".into())]);
        let same_env = data(&[("environment", "test".into()), ("usage_plan_name", "b".into())]);
        let new_env = data(&[("environment", "release".into())]);

        assert!(schema.requires_replace(&prior, &same_env).is_empty());
        assert_eq!(schema.requires_replace(&prior, &new_env), vec!["environment"]);
    }
}
