//! Generic validation command
//!
//! Validates `key=value` pairs against the `[form]` section of a
//! definition file.

use super::Ui;
use crate::error::{CliError, CliResult};
use bodymass_config::{ConfigService, FormDefinition, Validate, config_service::FORM_SECTION};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Options for `bodymass validate`
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub rules: PathBuf,
    pub values: Vec<(String, String)>,
    pub input: Option<PathBuf>,
    pub json: bool,
}

/// Parse a `key=value` argument.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in {:?}", s));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn execute(options: ValidateOptions, ui: &Ui) -> CliResult<()> {
    let form = load_form(&options.rules)?;

    let mut values = match &options.input {
        Some(path) => read_values(path)?,
        None => BTreeMap::new(),
    };
    values.extend(
        options
            .values
            .into_iter()
            .map(|(key, value)| (key, Value::String(value))),
    );

    if !options.json {
        ui.heading(&format!(
            "Validating {} field(s) against {}",
            form.rules.len(),
            options.rules.display()
        ));
    }

    let report = form.validator(values).into_report()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.passed {
        for (field, value) in &report.validated {
            ui.info(&format!("{} = {}", field, value));
        }
        ui.success(&format!("All {} field(s) passed", report.validated.len()));
    } else {
        for (field, messages) in report.errors.messages() {
            for message in messages {
                ui.field_error(field, message);
            }
        }
    }

    if report.passed {
        Ok(())
    } else {
        Err(CliError::Invalid {
            fields: report.errors.len(),
        })
    }
}

fn load_form(path: &PathBuf) -> CliResult<FormDefinition> {
    let service = ConfigService::builder().add_auto_file(path).build()?;

    if !service.has(FORM_SECTION) {
        return Err(CliError::Config(format!(
            "{} has no [{}] section",
            path.display(),
            FORM_SECTION
        )));
    }

    let form = service.form()?;
    form.validate()?;
    Ok(form)
}

fn read_values(path: &PathBuf) -> CliResult<BTreeMap<String, Value>> {
    let content = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(CliError::InvalidArgument(format!(
            "{} must hold a JSON object",
            path.display()
        ))),
    }
}
