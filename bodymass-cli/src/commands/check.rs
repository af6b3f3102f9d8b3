//! BMI check command
//!
//! Runs the BMI form over the given entries and prints either the first
//! message of each invalid field or the categorized BMI.

use super::Ui;
use crate::error::{CliError, CliResult};
use bodymass::{BmiForm, FIELDS, FormInput, FormOutcome};
use bodymass_config::ConfigService;
use std::path::PathBuf;

/// Options for `bodymass check`
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub input: FormInput,
    pub config: Option<PathBuf>,
    pub json: bool,
}

pub fn execute(options: CheckOptions, ui: &Ui) -> CliResult<()> {
    let form = match &options.config {
        Some(path) => {
            if !options.json {
                ui.info(&format!("Using form definition {}", path.display()));
            }
            let service = ConfigService::builder().add_auto_file(path).build()?;
            BmiForm::from_config(&service)?
        }
        None => BmiForm::new(),
    };

    let outcome = form.submit_input(options.input)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome {
        FormOutcome::Computed(result) => {
            if !options.json {
                ui.success(&result.message());
            }
            Ok(())
        }
        FormOutcome::Invalid { errors } => {
            if !options.json {
                // Form fields first, in display order, then anything a config added
                let mut ordered: Vec<&str> = FIELDS.to_vec();
                ordered.extend(
                    errors
                        .keys()
                        .map(String::as_str)
                        .filter(|f| !FIELDS.contains(f)),
                );
                for field in ordered {
                    if let Some(message) = errors.get(field) {
                        ui.field_error(field, message);
                    }
                }
            }
            Err(CliError::Invalid {
                fields: errors.len(),
            })
        }
    }
}
