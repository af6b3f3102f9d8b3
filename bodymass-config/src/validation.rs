// Configuration validation and form definitions

use crate::{ConfigError, ConfigManager, Result};
use bodymass_validation::{RuleRegistry, RuleSpec, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field rules and custom messages, as read from a `[form]` section.
///
/// ```toml
/// [form.rules]
/// weight_value = "Required|Numeric|Min:1"
///
/// [form.messages]
/// "weight_value.Required" = "The weight is required."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

impl FormDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, spec: impl Into<String>) -> Self {
        self.rules.insert(field.into(), spec.into());
        self
    }

    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Read the definition stored under `section`, usually `"form"`.
    pub fn from_manager(manager: &ConfigManager, section: &str) -> Result<Self> {
        manager.get(section)
    }

    /// Overlay `other`: its rules and messages replace same-keyed entries.
    pub fn merge(&mut self, other: FormDefinition) -> &mut Self {
        self.rules.extend(other.rules);
        self.messages.extend(other.messages);
        self
    }

    /// A validator for `values` using the built-in rules.
    pub fn validator(&self, values: BTreeMap<String, Value>) -> Validator {
        Validator::new(values, self.rules.clone(), self.messages.clone())
    }

    pub fn validator_with(
        &self,
        values: BTreeMap<String, Value>,
        registry: Arc<RuleRegistry>,
    ) -> Validator {
        self.validator(values).with_registry(registry)
    }

    /// Check that every rule spec parses and names a rule in `registry`.
    pub fn check_rules(&self, registry: &RuleRegistry) -> Result<()> {
        for (field, source) in &self.rules {
            let spec = RuleSpec::parse(source, registry)?;
            if let Some(call) = spec.iter().find(|call| !registry.contains(&call.name)) {
                return Err(ConfigError::ValidationError(format!(
                    "form.rules.{}: unknown rule {}",
                    field, call.name
                )));
            }
        }
        Ok(())
    }
}

impl Validate for FormDefinition {
    fn validate(&self) -> Result<()> {
        self.check_rules(&RuleRegistry::global())
    }
}

impl ConfigManager {
    /// Validate loaded configuration values against `rules`.
    ///
    /// Field names may be dotted paths into nested sections. Returns the
    /// validated values, or [`ConfigError::ValidationError`] listing the
    /// first message of each failing field.
    pub fn validate_with(
        &self,
        rules: &BTreeMap<String, String>,
        messages: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, Value>> {
        let mut values = BTreeMap::new();
        for field in rules.keys() {
            if let Some(value) = self.lookup(field)? {
                values.insert(field.clone(), value);
            }
        }

        let report = Validator::new(values, rules.clone(), messages.clone()).into_report()?;

        if report.passed {
            return Ok(report.validated);
        }

        let summary: Vec<String> = report
            .errors
            .keys()
            .into_iter()
            .map(|field| format!("{}: {}", field, report.errors.first(field)))
            .collect();
        Err(ConfigError::ValidationError(summary.join("; ")))
    }

    /// Validate against a [`FormDefinition`].
    pub fn validate_form(&self, form: &FormDefinition) -> Result<BTreeMap<String, Value>> {
        self.validate_with(&form.rules, &form.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_definition_deserializes_partial() {
        let form: FormDefinition =
            serde_json::from_value(serde_json::json!({ "rules": { "age": "Required" } }))
                .unwrap();
        assert_eq!(form.rules["age"], "Required");
        assert!(form.messages.is_empty());
    }

    #[test]
    fn test_check_rules() {
        let form = FormDefinition::new()
            .rule("weight", "Required|Numeric|Min:1")
            .rule("height", "Required,Numeric");
        assert!(form.validate().is_ok());

        let unknown = FormDefinition::new().rule("email", "Required|Email");
        let err = unknown.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: form.rules.email: unknown rule Email"
        );

        let malformed = FormDefinition::new().rule("x", "Min value:1");
        assert!(matches!(malformed.validate(), Err(ConfigError::Rules(_))));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = FormDefinition::new()
            .rule("weight", "Required")
            .message("weight.Required", "base");
        base.merge(FormDefinition::new().message("weight.Required", "override"));

        assert_eq!(base.rules["weight"], "Required");
        assert_eq!(base.messages["weight.Required"], "override");
    }

    #[test]
    fn test_validate_with() {
        let manager = ConfigManager::new();
        manager.set("min_weight", "1").unwrap();
        manager
            .set("units", serde_json::json!({ "weight": "kg", "height": "" }))
            .unwrap();

        let mut rules = BTreeMap::new();
        rules.insert("min_weight".to_string(), "Required|Numeric".to_string());
        rules.insert("units.weight".to_string(), "Required".to_string());
        let validated = manager.validate_with(&rules, &BTreeMap::new()).unwrap();
        assert_eq!(validated["units.weight"], "kg");

        rules.insert("units.height".to_string(), "Required".to_string());
        let mut messages = BTreeMap::new();
        messages.insert(
            "units.height.Required".to_string(),
            "A height unit must be configured".to_string(),
        );
        let err = manager.validate_with(&rules, &messages).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: units.height: A height unit must be configured"
        );
    }
}
