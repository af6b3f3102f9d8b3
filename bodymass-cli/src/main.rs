//! bodymass CLI - BMI checks and rule-based form validation.
//!
//! # Commands
//!
//! - `bodymass check` - Validate a weight/height entry and print the BMI
//! - `bodymass validate` - Validate key=value pairs against a form definition
//! - `bodymass rules` - List the available validation rules
//! - `bodymass completions` - Generate shell completions

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

mod commands;
mod error;

use bodymass::FormInput;
use commands::{Ui, check, rules, validate};
use error::CliResult;

/// bodymass - BMI checks from the command line
#[derive(Parser)]
#[command(name = "bodymass")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Validate weight and height entries and compute a categorized BMI")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} bodymass check --weight 70 --height 175\n  {} bodymass check -w 154 -H 5.75 --weight-unit lbs --height-unit ft/in\n  {} bodymass validate --rules form.toml --value age=42",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except results and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a weight/height entry and print the BMI
    #[command(alias = "c")]
    Check(CheckArgs),

    /// Validate key=value pairs against a form definition file
    #[command(alias = "v")]
    Validate(ValidateArgs),

    /// List the available validation rules
    #[command(alias = "r")]
    Rules {
        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Body weight
    #[arg(short, long, default_value = "", hide_default_value = true)]
    weight: String,

    /// Body height
    #[arg(short = 'H', long, default_value = "", hide_default_value = true)]
    height: String,

    /// Weight unit: kg or lbs
    #[arg(long, default_value = "kg")]
    weight_unit: String,

    /// Height unit: cm, ft/in or m
    #[arg(long, default_value = "cm")]
    height_unit: String,

    /// Form definition overriding the default rules and messages
    #[arg(short, long, env = "BODYMASS_CONFIG")]
    config: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Definition file with [form.rules] and [form.messages]
    #[arg(short, long)]
    rules: PathBuf,

    /// A field value, repeatable
    #[arg(long = "value", value_name = "KEY=VALUE", value_parser = validate::parse_key_value)]
    values: Vec<(String, String)>,

    /// JSON object file with field values
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Route log records by the global flags unless the environment chose a level.
fn configure_logging(verbose: bool, quiet: bool) {
    if verbose {
        bodymass_log::set_debug(true);
    } else if quiet {
        bodymass_log::set_level(bodymass_log::Level::Error);
    } else if std::env::var_os("BODYMASS_LOG_LEVEL").is_none() {
        bodymass_log::set_level(bodymass_log::Level::Warn);
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    configure_logging(cli.verbose, cli.quiet);
    let ui = Ui::new(cli.quiet);

    let result: CliResult<()> = match cli.command {
        Commands::Check(args) => check::execute(
            check::CheckOptions {
                input: FormInput::new(args.weight, args.height, args.weight_unit, args.height_unit),
                config: args.config,
                json: args.json,
            },
            &ui,
        ),

        Commands::Validate(args) => validate::execute(
            validate::ValidateOptions {
                rules: args.rules,
                values: args.values,
                input: args.input,
                json: args.json,
            },
            &ui,
        ),

        Commands::Rules { json } => rules::execute(&ui, json),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bodymass", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
