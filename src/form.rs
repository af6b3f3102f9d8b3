// The BMI entry form: its fields, rules and messages

use crate::bmi::{BmiResult, HeightUnit, WeightUnit};
use crate::error::{FormError, Result};
use bodymass_log::debug;
use bodymass_validation::{RuleRegistry, Validator, value_to_number, value_to_string};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const WEIGHT_VALUE: &str = "weight_value";
pub const HEIGHT_VALUE: &str = "height_value";
pub const WEIGHT_SPINNER: &str = "weight_spinner";
pub const HEIGHT_SPINNER: &str = "height_spinner";

/// Form field ids in display order.
pub const FIELDS: [&str; 4] = [WEIGHT_VALUE, HEIGHT_VALUE, WEIGHT_SPINNER, HEIGHT_SPINNER];

const VALUE_RULES: &str = "Required|Numeric|Min:1";
const UNIT_RULES: &str = "Required";

const DEFAULT_MESSAGES: [(&str, &str); 8] = [
    ("weight_value.Required", "The weight is required."),
    ("weight_value.Numeric", "Weight should be a number."),
    ("weight_value.Min", "The value should be no less than :min."),
    ("height_value.Required", "The height is required."),
    ("height_value.Numeric", "Height should be a number."),
    ("height_value.Min", "The value should be no less than :min."),
    ("weight_spinner.Required", "The weight type is required."),
    ("height_spinner.Required", "The height type is required."),
];

/// Raw form entries, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub weight: String,
    pub height: String,
    pub weight_unit: String,
    pub height_unit: String,
}

impl FormInput {
    pub fn new(
        weight: impl Into<String>,
        height: impl Into<String>,
        weight_unit: impl Into<String>,
        height_unit: impl Into<String>,
    ) -> Self {
        Self {
            weight: weight.into(),
            height: height.into(),
            weight_unit: weight_unit.into(),
            height_unit: height_unit.into(),
        }
    }

    /// The values map keyed by field id.
    pub fn into_values(self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            (WEIGHT_VALUE.to_string(), Value::String(self.weight)),
            (HEIGHT_VALUE.to_string(), Value::String(self.height)),
            (WEIGHT_SPINNER.to_string(), Value::String(self.weight_unit)),
            (HEIGHT_SPINNER.to_string(), Value::String(self.height_unit)),
        ])
    }
}

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FormOutcome {
    /// First message of each failing field
    Invalid { errors: BTreeMap<String, String> },
    Computed(BmiResult),
}

impl FormOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, FormOutcome::Computed(_))
    }
}

/// The BMI form: validates the four fields, then computes the BMI.
///
/// ```
/// use bodymass::{BmiForm, FormInput, FormOutcome};
///
/// let form = BmiForm::new();
/// let outcome = form.submit_input(FormInput::new("70", "1.75", "kg", "m")).unwrap();
///
/// match outcome {
///     FormOutcome::Computed(result) => assert_eq!(
///         result.message(),
///         "Your BMI is 22.86 which means you're Healthy Weight."
///     ),
///     FormOutcome::Invalid { errors } => panic!("unexpected errors: {:?}", errors),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BmiForm {
    rules: BTreeMap<String, String>,
    messages: BTreeMap<String, String>,
    registry: Arc<RuleRegistry>,
}

impl BmiForm {
    pub fn new() -> Self {
        let rules = BTreeMap::from([
            (WEIGHT_VALUE.to_string(), VALUE_RULES.to_string()),
            (HEIGHT_VALUE.to_string(), VALUE_RULES.to_string()),
            (WEIGHT_SPINNER.to_string(), UNIT_RULES.to_string()),
            (HEIGHT_SPINNER.to_string(), UNIT_RULES.to_string()),
        ]);
        let messages = DEFAULT_MESSAGES
            .iter()
            .map(|(key, message)| (key.to_string(), message.to_string()))
            .collect();

        Self {
            rules,
            messages,
            registry: RuleRegistry::global(),
        }
    }

    /// Build the form from the `[form]` section of loaded configuration.
    ///
    /// Configured rules and messages replace the defaults key by key.
    #[cfg(feature = "config")]
    pub fn from_config(service: &bodymass_config::ConfigService) -> Result<Self> {
        use bodymass_config::Validate;

        let definition = service.form()?;
        definition.validate()?;
        Ok(Self::new().with_definition(definition))
    }

    #[cfg(feature = "config")]
    pub fn with_definition(mut self, definition: bodymass_config::FormDefinition) -> Self {
        self.rules.extend(definition.rules);
        self.messages.extend(definition.messages);
        self
    }

    pub fn with_rule(mut self, field: impl Into<String>, spec: impl Into<String>) -> Self {
        self.rules.insert(field.into(), spec.into());
        self
    }

    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn rules(&self) -> &BTreeMap<String, String> {
        &self.rules
    }

    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    pub fn validator(&self, values: BTreeMap<String, Value>) -> Validator {
        Validator::new(values, self.rules.clone(), self.messages.clone())
            .with_registry(Arc::clone(&self.registry))
    }

    pub fn submit_input(&self, input: FormInput) -> Result<FormOutcome> {
        self.submit(input.into_values())
    }

    /// Validate `values` and, if every field passes, compute the BMI.
    pub fn submit(&self, values: BTreeMap<String, Value>) -> Result<FormOutcome> {
        let validator = self.validator(values);

        if validator.fails()? {
            let errors = validator
                .invalid_fields()?
                .into_iter()
                .map(|field| {
                    let message = validator.first(&field).map(str::to_string);
                    message.map(|message| (field, message))
                })
                .collect::<bodymass_validation::Result<BTreeMap<_, _>>>()?;

            debug!({ invalid = errors.len() }, "form rejected");
            return Ok(FormOutcome::Invalid { errors });
        }

        let validated = validator.validate()?;
        let weight = number(validated, WEIGHT_VALUE)?;
        let height = number(validated, HEIGHT_VALUE)?;

        let weight_unit = unit(validated, WEIGHT_SPINNER, WeightUnit::parse)?;
        let height_unit = unit(validated, HEIGHT_SPINNER, HeightUnit::parse)?;

        let kg = weight_unit.to_kg(weight);
        let meters = height_unit.to_meters(height);
        if meters <= 0.0 {
            return Err(FormError::InvalidNumber {
                field: HEIGHT_VALUE.to_string(),
                value: height.to_string(),
            });
        }

        let result = BmiResult::new(kg, meters);
        debug!(
            { bmi = format!("{:.2}", result.bmi), category = result.category },
            "computed BMI"
        );
        Ok(FormOutcome::Computed(result))
    }
}

impl Default for BmiForm {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(validated: &'a BTreeMap<String, Value>, field: &str) -> Result<&'a Value> {
    validated
        .get(field)
        .ok_or_else(|| FormError::MissingField(field.to_string()))
}

fn number(validated: &BTreeMap<String, Value>, name: &str) -> Result<f64> {
    let value = field(validated, name)?;
    value_to_number(value)
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field: name.to_string(),
            value: value_to_string(value).unwrap_or_default(),
        })
}

fn unit<U>(
    validated: &BTreeMap<String, Value>,
    name: &str,
    parse: impl Fn(&str) -> Option<U>,
) -> Result<U> {
    let raw = value_to_string(field(validated, name)?).unwrap_or_default();
    parse(&raw).ok_or_else(|| FormError::UnknownUnit {
        field: name.to_string(),
        unit: raw,
    })
}
