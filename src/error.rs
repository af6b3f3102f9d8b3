// Errors raised while submitting the BMI form

use thiserror::Error;

/// Errors that stop a form submission.
///
/// Failed field rules are not errors; they come back as
/// [`FormOutcome::Invalid`](crate::FormOutcome::Invalid).
#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] bodymass_validation::Error),

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] bodymass_config::ConfigError),

    #[error("Unknown {field} unit: {unit}")]
    UnknownUnit { field: String, unit: String },

    #[error("Validated values are missing {0}")]
    MissingField(String),

    #[error("{field} is not a usable number: {value}")]
    InvalidNumber { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, FormError>;
