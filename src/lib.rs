// bodymass - BMI form built on a rule-based field validator
//
// The form checks weight, height and their units with the validation engine,
// then converts to kilograms and meters and categorizes the BMI.

pub mod bmi;
pub mod error;
pub mod form;

pub use bmi::{BmiResult, CM_PER_FOOT, Category, HeightUnit, LBS_PER_KG, WeightUnit, compute_bmi};
pub use error::{FormError, Result};
pub use form::{
    BmiForm, FIELDS, FormInput, FormOutcome, HEIGHT_SPINNER, HEIGHT_VALUE, WEIGHT_SPINNER,
    WEIGHT_VALUE,
};

// Re-export workspace crates
pub use bodymass_log;
pub use bodymass_validation;

#[cfg(feature = "config")]
pub use bodymass_config;

/// Commonly used types
pub mod prelude {
    pub use crate::{BmiForm, BmiResult, Category, FormInput, FormOutcome};
    pub use bodymass_validation::{MessageBag, Rule, RuleRegistry, Validator};

    #[cfg(feature = "config")]
    pub use bodymass_config::{ConfigService, FormDefinition};
}
