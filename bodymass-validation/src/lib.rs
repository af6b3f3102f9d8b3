//! Rule-based field validation for bodymass
//!
//! Fields are checked against rule specs such as `Required|Numeric|Min:1`.
//! Each field stops at its first failing rule; failures land in a
//! [`MessageBag`] and passing values in the validated map.
//!
//! # Examples
//!
//! ## Validating a form
//!
//! ```
//! use bodymass_validation::Validator;
//!
//! let validator = Validator::builder()
//!     .value("weight_value", "0")
//!     .value("height_value", "175")
//!     .rule("weight_value", "Required|Numeric|Min:1")
//!     .rule("height_value", "Required|Numeric|Min:1")
//!     .message("weight_value.Min", "The value should be no less than :min.")
//!     .build();
//!
//! assert!(validator.fails().unwrap());
//! assert_eq!(
//!     validator.first("weight_value").unwrap(),
//!     "The value should be no less than 1."
//! );
//! ```
//!
//! ## Custom rules
//!
//! ```
//! use bodymass_validation::{RuleRegistry, Validator};
//! use std::sync::Arc;
//!
//! let mut registry = RuleRegistry::with_builtins();
//! registry.register_fn("WeightUnit", "The :key must be kg or lbs", |ctx| {
//!     matches!(ctx.text().as_deref(), Some("kg" | "lbs"))
//! });
//!
//! let validator = Validator::builder()
//!     .value("weight_spinner", "stone")
//!     .rule("weight_spinner", "Required|WeightUnit")
//!     .registry(Arc::new(registry))
//!     .build();
//!
//! assert_eq!(
//!     validator.first("weight_spinner").unwrap(),
//!     "The weight_spinner must be kg or lbs"
//! );
//! ```
//!
//! ## Collecting messages
//!
//! ```
//! use bodymass_validation::MessageBag;
//!
//! let mut a = MessageBag::new();
//! a.add("weight", "The weight is required.");
//! let mut b = MessageBag::new();
//! b.add("height", "The height is required.");
//!
//! a.merge([&b]);
//! assert_eq!(a.keys(), ["height", "weight"]);
//! ```

mod errors;
mod message_bag;
mod parallel;
mod rules;
mod traits;
mod validator;
pub mod validators;

pub use errors::*;
pub use message_bag::*;
pub use parallel::*;
pub use rules::*;
pub use traits::*;
pub use validator::*;
pub use validators::*;
