// Validator: runs each field's rules and collects the results

use crate::{MessageBag, Result, RuleContext, RuleRegistry, RuleSpec};
use bodymass_log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Serializable outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    /// Original values of the fields that passed
    pub validated: BTreeMap<String, Value>,
    /// Messages of the fields that failed
    pub errors: MessageBag,
}

#[derive(Debug, Clone, Default)]
struct ValidationRun {
    validated: BTreeMap<String, Value>,
    errors: MessageBag,
    failed: bool,
}

/// Validates a set of field values against per-field rule specs.
///
/// The run happens on the first call that needs results and is cached for
/// the life of the validator. A configuration error from that first run is
/// cached too, so later calls return the same error. Each field stops at its
/// first failing rule, but every field is checked.
///
/// ```
/// use bodymass_validation::Validator;
///
/// let validator = Validator::builder()
///     .value("weight", "")
///     .value("height", "1.75")
///     .rule("weight", "Required,Numeric,Min:1")
///     .rule("height", "Required,Numeric,Min:1")
///     .message("weight.Required", "The weight is required.")
///     .build();
///
/// assert!(validator.fails().unwrap());
/// assert_eq!(validator.first("weight").unwrap(), "The weight is required.");
/// assert_eq!(validator.invalid_fields().unwrap(), ["weight"]);
/// assert_eq!(validator.valid_fields().unwrap(), ["height"]);
/// ```
#[derive(Debug)]
pub struct Validator {
    values: BTreeMap<String, Value>,
    rules: BTreeMap<String, String>,
    messages: BTreeMap<String, String>,
    registry: Arc<RuleRegistry>,
    run: OnceCell<Result<ValidationRun>>,
}

impl Validator {
    /// Create a validator using the built-in rules.
    ///
    /// `messages` is keyed by `"field.RuleName"`.
    pub fn new(
        values: BTreeMap<String, Value>,
        rules: BTreeMap<String, String>,
        messages: BTreeMap<String, String>,
    ) -> Self {
        Self {
            values,
            rules,
            messages,
            registry: RuleRegistry::global(),
            run: OnceCell::new(),
        }
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    /// Use `registry` to resolve rule names instead of the built-ins.
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self.run = OnceCell::new();
        self
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Whether any field failed.
    pub fn fails(&self) -> Result<bool> {
        Ok(self.run()?.failed)
    }

    pub fn passes(&self) -> Result<bool> {
        Ok(!self.fails()?)
    }

    pub fn errors(&self) -> Result<&MessageBag> {
        Ok(&self.run()?.errors)
    }

    /// Original values of the fields that passed.
    pub fn validate(&self) -> Result<&BTreeMap<String, Value>> {
        Ok(&self.run()?.validated)
    }

    pub fn invalid_fields(&self) -> Result<Vec<String>> {
        Ok(self
            .errors()?
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Every field minus the invalid ones.
    pub fn valid_fields(&self) -> Result<Vec<String>> {
        let errors = self.errors()?;
        Ok(self
            .fields()
            .into_iter()
            .filter(|field| !errors.has(field))
            .collect())
    }

    pub fn first(&self, key: &str) -> Result<&str> {
        Ok(self.errors()?.first(key))
    }

    pub fn get(&self, key: &str) -> Result<Option<&[String]>> {
        Ok(self.errors()?.get(key))
    }

    /// Whether `key` was among the supplied values.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Every field named by a value or a rule, sorted.
    pub fn fields(&self) -> Vec<String> {
        self.values
            .keys()
            .chain(self.rules.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Replace a backing value.
    ///
    /// A run that already happened is not repeated.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn report(&self) -> Result<ValidationReport> {
        let run = self.run()?;
        Ok(ValidationReport {
            passed: !run.failed,
            validated: run.validated.clone(),
            errors: run.errors.clone(),
        })
    }

    /// Run if needed and hand the results over without cloning.
    pub fn into_report(self) -> Result<ValidationReport> {
        self.run()?;
        let run = self.run.into_inner().unwrap_or_else(|| Ok(ValidationRun::default()))?;
        Ok(ValidationReport {
            passed: !run.failed,
            validated: run.validated,
            errors: run.errors,
        })
    }

    fn run(&self) -> Result<&ValidationRun> {
        self.run
            .get_or_init(|| {
                self.execute()
                    .inspect_err(|e| warn!({ error = e }, "validation aborted"))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    fn execute(&self) -> Result<ValidationRun> {
        debug!({ fields = self.rules.len() }, "running validation");

        let mut run = ValidationRun::default();

        for (field, source) in &self.rules {
            let spec = RuleSpec::parse(source, &self.registry)?;
            let value = self.values.get(field).unwrap_or(&NULL);

            match self.check_field(field, value, &spec)? {
                Some(message) => {
                    run.errors.add(field.as_str(), message);
                    run.failed = true;
                }
                None => {
                    run.validated.insert(field.clone(), value.clone());
                }
            }
        }

        debug!(
            { failed = run.failed, invalid = run.errors.len() },
            "validation finished"
        );
        Ok(run)
    }

    /// Run `spec` against one field; the failure message if a rule fails.
    fn check_field(&self, field: &str, value: &Value, spec: &RuleSpec) -> Result<Option<String>> {
        for call in spec {
            let rule = self.registry.create(&call.name)?;
            let message_key = format!("{}.{}", field, call.name);
            let ctx = RuleContext::new(field, value)
                .with_message(self.messages.get(&message_key).map(String::as_str))
                .with_params(&call.params);

            let outcome = rule.evaluate(&ctx)?;

            if !outcome.valid {
                trace!({ field = field, rule = call }, "rule failed");
                return Ok(Some(outcome.message));
            }
            if !outcome.continue_chain {
                trace!({ field = field, rule = call }, "rule stopped the chain");
                break;
            }
            trace!({ field = field, rule = call }, "rule passed");
        }

        Ok(None)
    }
}

/// Builder for [`Validator`].
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    values: BTreeMap<String, Value>,
    rules: BTreeMap<String, String>,
    messages: BTreeMap<String, String>,
    registry: Option<Arc<RuleRegistry>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach a rule-spec string to `field`.
    pub fn rule(mut self, field: impl Into<String>, spec: impl Into<String>) -> Self {
        self.rules.insert(field.into(), spec.into());
        self
    }

    /// Attach one token per rule, e.g. `["Required", "Min:1"]`.
    pub fn rule_tokens<I, S>(self, field: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .collect();
        self.rule(field, joined.join("|"))
    }

    pub fn rules<I, K, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        self.rules
            .extend(rules.into_iter().map(|(k, s)| (k.into(), s.into())));
        self
    }

    /// Custom template for `"field.RuleName"`.
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    pub fn messages<I, K, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        self.messages
            .extend(messages.into_iter().map(|(k, s)| (k.into(), s.into())));
        self
    }

    pub fn registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Validator {
        let validator = Validator::new(self.values, self.rules, self.messages);
        match self.registry {
            Some(registry) => validator.with_registry(registry),
            None => validator,
        }
    }
}
