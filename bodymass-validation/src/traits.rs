// The rule contract shared by every check

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// String form of a value, or `None` for null.
///
/// Strings are used as-is, numbers and booleans through their display form,
/// arrays and objects as compact JSON.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Numeric reading of a value, if it has a finite one.
///
/// `inf` and `NaN` spellings do not count as numbers.
pub fn value_to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Everything a rule sees for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Field name, substituted for `:key`
    pub key: &'a str,
    /// Raw value under test
    pub value: &'a Value,
    /// Custom template for this field and rule, if one was given
    pub message: Option<&'a str>,
    /// Extra operands from the rule token, e.g. the `1` in `Min:1`
    pub params: &'a [String],
}

impl<'a> RuleContext<'a> {
    pub fn new(key: &'a str, value: &'a Value) -> Self {
        Self {
            key,
            value,
            message: None,
            params: &[],
        }
    }

    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    pub fn with_params(mut self, params: &'a [String]) -> Self {
        self.params = params;
        self
    }

    pub fn text(&self) -> Option<String> {
        value_to_string(self.value)
    }

    /// Non-null with a non-empty string form.
    pub fn is_present(&self) -> bool {
        self.text().is_some_and(|s| !s.is_empty())
    }
}

/// Verdict of one rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub valid: bool,
    /// Resolved message; empty when valid
    pub message: String,
    /// Whether later rules for the same field still run
    pub continue_chain: bool,
}

impl Default for RuleOutcome {
    fn default() -> Self {
        Self {
            valid: false,
            message: String::new(),
            continue_chain: true,
        }
    }
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Valid, and skip the rest of the field's rules.
    pub fn halt() -> Self {
        Self {
            valid: true,
            continue_chain: false,
            ..Self::default()
        }
    }
}

/// A single named check.
///
/// Implementors override [`Rule::evaluate`]; a rule that does not is
/// reported as [`Error::UnimplementedRule`] when it is run.
///
/// ```
/// use bodymass_validation::{Rule, RuleContext, RuleOutcome, Result};
///
/// struct Even;
///
/// impl Rule for Even {
///     fn name(&self) -> &str {
///         "Even"
///     }
///
///     fn default_message(&self) -> &str {
///         "The :key must be even"
///     }
///
///     fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
///         let even = ctx.value.as_i64().is_some_and(|n| n % 2 == 0);
///         Ok(self.outcome(ctx, even))
///     }
/// }
///
/// let value = serde_json::json!(3);
/// let outcome = Even.evaluate(&RuleContext::new("count", &value)).unwrap();
/// assert_eq!(outcome.message, "The count must be even");
/// ```
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn default_message(&self) -> &str {
        "The :key field is incorrect."
    }

    fn evaluate(&self, _ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        Err(Error::UnimplementedRule(self.name().to_string()))
    }

    /// Rule-specific placeholders such as `:min`, applied after `:key` and
    /// `:value`.
    fn placeholders(&self, _ctx: &RuleContext<'_>) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Resolve the custom or default template against `ctx`.
    fn finalize_message(&self, ctx: &RuleContext<'_>) -> String {
        let template = ctx.message.unwrap_or_else(|| self.default_message());
        let mut message = template
            .replace(":key", ctx.key)
            .replace(":value", &ctx.text().unwrap_or_default());

        for (placeholder, value) in self.placeholders(ctx) {
            message = message.replace(placeholder, &value);
        }

        message
    }

    /// Build the outcome for a verdict, with `continue_chain` left on.
    fn outcome(&self, ctx: &RuleContext<'_>, valid: bool) -> RuleOutcome {
        if valid {
            RuleOutcome::pass()
        } else {
            RuleOutcome::fail(self.finalize_message(ctx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Incomplete;

    impl Rule for Incomplete {
        fn name(&self) -> &str {
            "Incomplete"
        }
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_string(&json!("70")), Some("70".to_string()));
        assert_eq!(value_to_string(&json!(1.75)), Some("1.75".to_string()));
        assert_eq!(value_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(value_to_string(&json!([1, 2])), Some("[1,2]".to_string()));
    }

    #[test]
    fn test_value_to_number() {
        assert_eq!(value_to_number(&json!(" 1.5 ")), Some(1.5));
        assert_eq!(value_to_number(&json!(70)), Some(70.0));
        assert_eq!(value_to_number(&json!("1e2")), Some(100.0));
        assert_eq!(value_to_number(&json!("seventy")), None);
        assert_eq!(value_to_number(&json!(false)), None);
        assert_eq!(value_to_number(&json!(null)), None);
        assert_eq!(value_to_number(&json!("inf")), None);
        assert_eq!(value_to_number(&json!("-Infinity")), None);
        assert_eq!(value_to_number(&json!("NaN")), None);
    }

    #[test]
    fn test_outcome_defaults() {
        let outcome = RuleOutcome::default();
        assert!(!outcome.valid);
        assert!(outcome.continue_chain);

        let halted = RuleOutcome::halt();
        assert!(halted.valid);
        assert!(!halted.continue_chain);
    }

    #[test]
    fn test_unimplemented_rule_errors() {
        let value = json!("x");
        let err = Incomplete
            .evaluate(&RuleContext::new("field", &value))
            .unwrap_err();
        assert_eq!(err, Error::UnimplementedRule("Incomplete".to_string()));
    }

    #[test]
    fn test_finalize_message_substitutes_key_and_value() {
        let value = json!("abc");
        let ctx = RuleContext::new("age", &value).with_message(Some(":key got :value"));
        assert_eq!(Incomplete.finalize_message(&ctx), "age got abc");

        let null = json!(null);
        let ctx = RuleContext::new("age", &null);
        assert_eq!(Incomplete.finalize_message(&ctx), "The age field is incorrect.");
    }

    #[test]
    fn test_is_present() {
        let empty = json!("");
        let null = json!(null);
        let zero = json!(0);
        assert!(!RuleContext::new("f", &empty).is_present());
        assert!(!RuleContext::new("f", &null).is_present());
        assert!(RuleContext::new("f", &zero).is_present());
    }
}
