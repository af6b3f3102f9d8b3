// Built-in rules

use crate::{Error, Result, Rule, RuleContext, RuleOutcome, value_to_number};
use std::sync::Arc;

/// Valid when the value is non-null with a non-empty string form.
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "Required"
    }

    fn default_message(&self) -> &str {
        "The :key field is required"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        Ok(self.outcome(ctx, ctx.is_present()))
    }
}

/// Valid when the value reads as a floating-point number.
pub struct Numeric;

impl Rule for Numeric {
    fn name(&self) -> &str {
        "Numeric"
    }

    fn default_message(&self) -> &str {
        "The :key should be a number"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        Ok(self.outcome(ctx, value_to_number(ctx.value).is_some()))
    }
}

/// Read `params[0]` as the comparison operand of `rule`.
fn threshold(rule: &str, params: &[String]) -> Result<f64> {
    let raw = params.first().ok_or_else(|| Error::MissingThreshold {
        rule: rule.to_string(),
        given: params.len(),
    })?;

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::InvalidThreshold {
            rule: rule.to_string(),
            value: raw.clone(),
        })
}

/// Valid when the value is numeric and not below `params[0]`.
///
/// A missing or non-numeric threshold is a configuration error.
pub struct Min;

impl Rule for Min {
    fn name(&self) -> &str {
        "Min"
    }

    fn default_message(&self) -> &str {
        "The :key may not be less than :min"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        let min = threshold(self.name(), ctx.params)?;
        let valid = value_to_number(ctx.value).is_some_and(|v| v >= min);
        Ok(self.outcome(ctx, valid))
    }

    fn placeholders(&self, ctx: &RuleContext<'_>) -> Vec<(&'static str, String)> {
        ctx.params
            .first()
            .map(|min| vec![(":min", min.clone())])
            .unwrap_or_default()
    }
}

/// Valid when the value is numeric and not above `params[0]`.
pub struct Max;

impl Rule for Max {
    fn name(&self) -> &str {
        "Max"
    }

    fn default_message(&self) -> &str {
        "The :key may not be greater than :max"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        let max = threshold(self.name(), ctx.params)?;
        let valid = value_to_number(ctx.value).is_some_and(|v| v <= max);
        Ok(self.outcome(ctx, valid))
    }

    fn placeholders(&self, ctx: &RuleContext<'_>) -> Vec<(&'static str, String)> {
        ctx.params
            .first()
            .map(|max| vec![(":max", max.clone())])
            .unwrap_or_default()
    }
}

const BOOLEAN_TOKENS: [&str; 6] = ["0", "1", "true", "false", "on", "off"];

/// Valid when the lower-cased string form is a boolean token.
pub struct Boolean;

impl Rule for Boolean {
    fn name(&self) -> &str {
        "Boolean"
    }

    fn default_message(&self) -> &str {
        "The :key must either be true or false"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        let valid = ctx
            .text()
            .is_some_and(|s| BOOLEAN_TOKENS.contains(&s.to_lowercase().as_str()));
        Ok(self.outcome(ctx, valid))
    }
}

/// Valid for null, invalid for the empty string.
///
/// Any other value keeps the default verdict, which is invalid.
pub struct Nullable;

impl Rule for Nullable {
    fn name(&self) -> &str {
        "Nullable"
    }

    fn default_message(&self) -> &str {
        "The :key field can be null"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        let verdict = match ctx.text() {
            None => true,
            Some(text) if text.is_empty() => false,
            Some(_) => RuleOutcome::default().valid,
        };
        Ok(self.outcome(ctx, verdict))
    }
}

/// Always valid; stops the field's chain when the value is absent.
pub struct Sometimes;

impl Rule for Sometimes {
    fn name(&self) -> &str {
        "Sometimes"
    }

    fn default_message(&self) -> &str {
        "The :key field is required to have a value, or leave it as blank"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        if ctx.is_present() {
            Ok(RuleOutcome::pass())
        } else {
            Ok(RuleOutcome::halt())
        }
    }
}

type CheckFn = Arc<dyn Fn(&RuleContext<'_>) -> bool + Send + Sync>;

/// A rule backed by a closure, for registering checks without a new type.
#[derive(Clone)]
pub struct FnRule {
    name: String,
    message: String,
    check: CheckFn,
}

impl FnRule {
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            check: Arc::new(check),
        }
    }
}

impl Rule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_message(&self) -> &str {
        &self.message
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
        Ok(self.outcome(ctx, (self.check)(ctx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn eval(rule: &dyn Rule, value: Value, params: &[&str]) -> Result<RuleOutcome> {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let ctx = RuleContext::new("field", &value).with_params(&params);
        rule.evaluate(&ctx)
    }

    #[test]
    fn test_required() {
        assert!(eval(&Required, json!("x"), &[]).unwrap().valid);
        assert!(eval(&Required, json!(0), &[]).unwrap().valid);
        assert!(!eval(&Required, json!(""), &[]).unwrap().valid);

        let outcome = eval(&Required, json!(null), &[]).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The field field is required");
    }

    #[test]
    fn test_numeric() {
        assert!(eval(&Numeric, json!("70"), &[]).unwrap().valid);
        assert!(eval(&Numeric, json!("-1.75"), &[]).unwrap().valid);
        assert!(eval(&Numeric, json!(42), &[]).unwrap().valid);
        assert!(!eval(&Numeric, json!("70kg"), &[]).unwrap().valid);
        assert!(!eval(&Numeric, json!(""), &[]).unwrap().valid);
        assert!(!eval(&Numeric, json!(null), &[]).unwrap().valid);
    }

    #[test]
    fn test_non_finite_values_fail_as_messages() {
        let outcome = eval(&Numeric, json!("inf"), &[]).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The field should be a number");

        assert!(!eval(&Numeric, json!("NaN"), &[]).unwrap().valid);
        assert!(!eval(&Min, json!("inf"), &["1"]).unwrap().valid);
        assert!(!eval(&Max, json!("-inf"), &["250"]).unwrap().valid);
    }

    #[test]
    fn test_numeric_valid_message_is_empty() {
        let outcome = eval(&Numeric, json!("1"), &[]).unwrap();
        assert_eq!(outcome.message, "");
    }

    #[test]
    fn test_min_boundaries() {
        assert!(eval(&Min, json!("1"), &["1"]).unwrap().valid);
        assert!(eval(&Min, json!("1.5"), &["1"]).unwrap().valid);

        let outcome = eval(&Min, json!("0"), &["1"]).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The field may not be less than 1");
    }

    #[test]
    fn test_min_non_numeric_value_fails() {
        assert!(!eval(&Min, json!("abc"), &["1"]).unwrap().valid);
    }

    #[test]
    fn test_min_threshold_errors() {
        assert_eq!(
            eval(&Min, json!("5"), &[]).unwrap_err(),
            Error::MissingThreshold {
                rule: "Min".to_string(),
                given: 0
            }
        );
        assert_eq!(
            eval(&Min, json!("5"), &["one"]).unwrap_err(),
            Error::InvalidThreshold {
                rule: "Min".to_string(),
                value: "one".to_string()
            }
        );
    }

    #[test]
    fn test_max() {
        assert!(eval(&Max, json!("10"), &["10"]).unwrap().valid);

        let outcome = eval(&Max, json!("300"), &["250"]).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The field may not be greater than 250");

        assert!(matches!(
            eval(&Max, json!("5"), &[]),
            Err(Error::MissingThreshold { .. })
        ));
        assert!(matches!(
            eval(&Max, json!("5"), &["x"]),
            Err(Error::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_custom_message_placeholders() {
        let value = json!("0");
        let params = vec!["1".to_string()];
        let ctx = RuleContext::new("weight_value", &value)
            .with_params(&params)
            .with_message(Some("The value should be no less than :min."));
        let outcome = Min.evaluate(&ctx).unwrap();
        assert_eq!(outcome.message, "The value should be no less than 1.");
    }

    #[test]
    fn test_boolean() {
        for token in ["0", "1", "true", "FALSE", "On", "off"] {
            assert!(eval(&Boolean, json!(token), &[]).unwrap().valid, "{}", token);
        }
        assert!(eval(&Boolean, json!(true), &[]).unwrap().valid);
        assert!(eval(&Boolean, json!(1), &[]).unwrap().valid);
        assert!(!eval(&Boolean, json!("yes"), &[]).unwrap().valid);
        assert!(!eval(&Boolean, json!(null), &[]).unwrap().valid);
    }

    #[test]
    fn test_nullable() {
        assert!(eval(&Nullable, json!(null), &[]).unwrap().valid);

        let outcome = eval(&Nullable, json!(""), &[]).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The field field can be null");

        assert!(!eval(&Nullable, json!("value"), &[]).unwrap().valid);
    }

    #[test]
    fn test_sometimes() {
        let absent = eval(&Sometimes, json!(null), &[]).unwrap();
        assert!(absent.valid);
        assert!(!absent.continue_chain);

        let blank = eval(&Sometimes, json!(""), &[]).unwrap();
        assert!(!blank.continue_chain);

        let present = eval(&Sometimes, json!("x"), &[]).unwrap();
        assert!(present.valid);
        assert!(present.continue_chain);
    }

    #[test]
    fn test_fn_rule() {
        let rule = FnRule::new("Metric", "The :key must be kg or cm", |ctx| {
            matches!(ctx.text().as_deref(), Some("kg") | Some("cm"))
        });
        assert_eq!(rule.name(), "Metric");
        assert!(eval(&rule, json!("kg"), &[]).unwrap().valid);

        let outcome = eval(&rule, json!("lbs"), &[]).unwrap();
        assert_eq!(outcome.message, "The field must be kg or cm");
    }
}
