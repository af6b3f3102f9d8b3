// Configuration errors raised while running validation

use thiserror::Error;

/// Errors that abort a validation run.
///
/// A field failing its rules is not an error; those failures are collected
/// in a [`MessageBag`](crate::MessageBag).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough validator values passed to {rule}: needs 1, only {given} passed")]
    MissingThreshold { rule: String, given: usize },

    #[error("Incorrect validator value type for {rule}: {value} is not a number")]
    InvalidThreshold { rule: String, value: String },

    #[error("Unimplemented rule: {0} does not define evaluate()")]
    UnimplementedRule(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Invalid rule token: {0:?}")]
    InvalidRuleToken(String),

    #[error("No messages exist for key: {0}")]
    MissingKey(String),

    #[error("Index {index} is out of range for {key} ({len} messages)")]
    IndexOutOfRange {
        key: String,
        index: usize,
        len: usize,
    },

    #[error("Validation task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
