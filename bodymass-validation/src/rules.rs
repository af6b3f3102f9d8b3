// Rule registry and rule-spec parsing

use crate::validators::{Boolean, FnRule, Max, Min, Nullable, Numeric, Required, Sometimes};
use crate::{Error, Result, Rule, RuleContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static RULE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("rule name pattern"));

static GLOBAL_REGISTRY: Lazy<Arc<RuleRegistry>> =
    Lazy::new(|| Arc::new(RuleRegistry::with_builtins()));

/// Produces a fresh rule instance for each evaluation.
pub type RuleFactory = Arc<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// Maps rule names used in rule specs to rule factories.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<String, RuleFactory>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `Required`, `Numeric`, `Min`, `Max`, `Boolean`,
    /// `Nullable` and `Sometimes`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("Required", || Required)
            .register("Numeric", || Numeric)
            .register("Min", || Min)
            .register("Max", || Max)
            .register("Boolean", || Boolean)
            .register("Nullable", || Nullable)
            .register("Sometimes", || Sometimes);
        registry
    }

    /// The shared registry of built-in rules.
    pub fn global() -> Arc<RuleRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Register (or replace) a rule under `name`.
    pub fn register<F, R>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Rule + 'static,
    {
        self.factories
            .insert(name.into(), Arc::new(move || Box::new(factory()) as Box<dyn Rule>));
        self
    }

    /// Register a closure-backed rule with a default message template.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        check: F,
    ) -> &mut Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let rule = FnRule::new(name.clone(), message, check);
        self.register(name, move || rule.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the rule registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Rule>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}

/// One rule token: a name and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCall {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl RuleCall {
    /// Parse `Name` or `Name:p1,p2`.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        let (name, params) = match token.split_once(':') {
            Some((name, params)) => (
                name.trim(),
                params
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => (token, Vec::new()),
        };

        if !RULE_NAME_REGEX.is_match(name) {
            return Err(Error::InvalidRuleToken(token.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            params,
        })
    }
}

impl fmt::Display for RuleCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.params.join(","))
        }
    }
}

/// The ordered rules attached to one field.
///
/// ```
/// use bodymass_validation::{RuleRegistry, RuleSpec};
///
/// let registry = RuleRegistry::with_builtins();
/// let spec = RuleSpec::parse("Required,Numeric,Min:1,Max:500", &registry).unwrap();
/// let names: Vec<&str> = spec.iter().map(|call| call.name.as_str()).collect();
/// assert_eq!(names, ["Required", "Numeric", "Min", "Max"]);
/// assert_eq!(spec.to_string(), "Required|Numeric|Min:1|Max:500");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec {
    calls: Vec<RuleCall>,
}

impl RuleSpec {
    /// Parse a rule-spec string.
    ///
    /// Tokens are separated by `|` or `,`. With `|` present, commas only
    /// separate parameters. Without it, a comma segment following a
    /// parameterized token stays a parameter of that token unless it names a
    /// registered rule or could be a rule name at all. `Min:1,Max:5` is two
    /// rules, `Between:1,5` is one, and a misspelled `Min:1,Requird` keeps
    /// `Requird` as a rule so that resolving it fails.
    pub fn parse(source: &str, registry: &RuleRegistry) -> Result<Self> {
        if source.contains('|') {
            let calls = source
                .split('|')
                .filter(|token| !token.trim().is_empty())
                .map(RuleCall::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self { calls });
        }

        let mut calls: Vec<RuleCall> = Vec::new();
        let mut open = false;

        for segment in source.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let name = segment.split(':').next().unwrap_or_default().trim();
            let starts_rule = !open
                || segment.contains(':')
                || registry.contains(name)
                || RULE_NAME_REGEX.is_match(name);

            match calls.last_mut() {
                Some(last) if !starts_rule => last.params.push(segment.to_string()),
                _ => {
                    open = segment.contains(':');
                    calls.push(RuleCall::parse(segment)?);
                }
            }
        }

        Ok(Self { calls })
    }

    /// Build a spec from one token per rule, e.g. `["Required", "Min:1"]`.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let calls = tokens
            .into_iter()
            .filter(|token| !token.as_ref().trim().is_empty())
            .map(|token| RuleCall::parse(token.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { calls })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleCall> {
        self.calls.iter()
    }

    pub fn calls(&self) -> &[RuleCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.calls.iter().map(RuleCall::to_string).collect();
        write!(f, "{}", tokens.join("|"))
    }
}

impl<'a> IntoIterator for &'a RuleSpec {
    type Item = &'a RuleCall;
    type IntoIter = std::slice::Iter<'a, RuleCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(spec: &RuleSpec) -> Vec<&str> {
        spec.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_builtins_registered() {
        let registry = RuleRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            ["Boolean", "Max", "Min", "Nullable", "Numeric", "Required", "Sometimes"]
        );
        assert!(registry.create("Required").is_ok());
    }

    #[test]
    fn test_create_unknown_rule() {
        let registry = RuleRegistry::with_builtins();
        assert_eq!(
            registry.create("Email").err(),
            Some(Error::UnknownRule("Email".to_string()))
        );
    }

    #[test]
    fn test_register_fn() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_fn("Unit", "The :key must be a known unit", |ctx| {
            matches!(ctx.text().as_deref(), Some("kg" | "lbs"))
        });

        let rule = registry.create("Unit").unwrap();
        let value = json!("stone");
        let outcome = rule.evaluate(&RuleContext::new("weight_spinner", &value)).unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.message, "The weight_spinner must be a known unit");
    }

    #[test]
    fn test_parse_comma_separated() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::parse("Required,Numeric,Min:1", &registry).unwrap();
        assert_eq!(names(&spec), ["Required", "Numeric", "Min"]);
        assert_eq!(spec.calls()[2].params, ["1"]);
    }

    #[test]
    fn test_parse_multi_param_with_commas() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_fn("Between", "The :key is out of range", |_| true);

        let spec = RuleSpec::parse("Between:1,5,Required", &registry).unwrap();
        assert_eq!(names(&spec), ["Between", "Required"]);
        assert_eq!(spec.calls()[0].params, ["1", "5"]);
    }

    #[test]
    fn test_parse_pipe_separated() {
        let registry = RuleRegistry::new();
        let spec = RuleSpec::parse(" Required | Between:1, 5 |", &registry).unwrap();
        assert_eq!(names(&spec), ["Required", "Between"]);
        assert_eq!(spec.calls()[1].params, ["1", "5"]);
    }

    #[test]
    fn test_parse_keeps_unknown_bare_rule() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::parse("Required,Email", &registry).unwrap();
        assert_eq!(names(&spec), ["Required", "Email"]);
    }

    #[test]
    fn test_parse_misspelled_rule_after_params() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::parse("Numeric,Min:1,Requird", &registry).unwrap();
        assert_eq!(names(&spec), ["Numeric", "Min", "Requird"]);
        assert_eq!(spec.calls()[1].params, ["1"]);

        let unknown = spec.iter().find_map(|call| registry.create(&call.name).err());
        assert_eq!(unknown, Some(Error::UnknownRule("Requird".to_string())));
    }

    #[test]
    fn test_parse_numeric_params_stay_with_rule() {
        let registry = RuleRegistry::with_builtins();
        let spec = RuleSpec::parse("Min:1,Max:5,-2.5", &registry).unwrap();
        assert_eq!(names(&spec), ["Min", "Max"]);
        assert_eq!(spec.calls()[1].params, ["5", "-2.5"]);
    }

    #[test]
    fn test_parse_empty_spec() {
        let registry = RuleRegistry::with_builtins();
        assert!(RuleSpec::parse("", &registry).unwrap().is_empty());
        assert!(RuleSpec::parse(" , ", &registry).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_token() {
        let registry = RuleRegistry::with_builtins();
        assert_eq!(
            RuleSpec::parse(":5", &registry).unwrap_err(),
            Error::InvalidRuleToken(":5".to_string())
        );
        assert!(RuleCall::parse("Min Value:3").is_err());
    }

    #[test]
    fn test_from_tokens_round_trip_display() {
        let spec = RuleSpec::from_tokens(["Required", "Numeric", "Min:1"]).unwrap();
        assert_eq!(spec.to_string(), "Required|Numeric|Min:1");
        assert_eq!(spec.len(), 3);
    }
}
