//! Error types for the bodymass CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration or form definition error
    Config(String),

    /// A rule spec could not be run
    Rules(String),

    /// The form could not turn validated values into a BMI
    Form(String),

    /// Invalid argument
    InvalidArgument(String),

    /// Input failed validation
    Invalid { fields: usize },

    /// JSON output or input error
    Json(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Rules(msg) => write!(f, "Rule error: {}", msg),
            CliError::Form(msg) => write!(f, "Form error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Invalid { fields } => {
                write!(f, "Validation failed for {} field(s)", fields)
            }
            CliError::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<bodymass_config::ConfigError> for CliError {
    fn from(e: bodymass_config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<bodymass_validation::Error> for CliError {
    fn from(e: bodymass_validation::Error) -> Self {
        CliError::Rules(e.to_string())
    }
}

impl From<bodymass::FormError> for CliError {
    fn from(e: bodymass::FormError) -> Self {
        match e {
            bodymass::FormError::Config(e) => e.into(),
            bodymass::FormError::Validation(e) => e.into(),
            other => CliError::Form(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e.to_string())
    }
}
