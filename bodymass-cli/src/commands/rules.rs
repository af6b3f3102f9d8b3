//! Rule listing command
//!
//! Lists every rule a rule spec may name, with its default message.

use super::Ui;
use crate::error::CliError;
use bodymass_validation::RuleRegistry;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RuleInfo {
    name: String,
    message: String,
}

pub fn execute(ui: &Ui, json: bool) -> Result<(), CliError> {
    let registry = RuleRegistry::global();

    let rules = registry
        .names()
        .into_iter()
        .map(|name| {
            registry.create(name).map(|rule| RuleInfo {
                name: name.to_string(),
                message: rule.default_message().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    ui.heading("Validation rules");

    let width = rules.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for rule in &rules {
        println!(
            "  {:<width$}  {}",
            rule.name.cyan(),
            rule.message.dimmed(),
            width = width
        );
    }

    println!();
    ui.info("Rules take parameters after a colon, e.g. Min:1");
    ui.info("Separate rules with | or , e.g. Required|Numeric|Min:1");

    Ok(())
}
