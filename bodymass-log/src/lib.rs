//! bodymass logging
//!
//! Structured logging for the bodymass crates, controlled through
//! `BODYMASS_*` environment variables.
//!
//! # Features
//!
//! - **Environment-controlled**: `BODYMASS_DEBUG=1` enables debug logging
//! - **Key-value fields**: attach `{ name = value }` pairs to any record
//! - **Multiple backends**: records from the `log` facade can be routed
//!   through the same formatter, and a `tracing` subscriber is available
//!   behind the `tracing` feature
//!
//! # Usage
//!
//! ```rust
//! use bodymass_log::{debug, info, trace, warn};
//!
//! info!("Form submitted");
//! debug!("Validating {} fields", 4);
//!
//! // With key-value fields
//! let field = "weight_value";
//! trace!({ field = field, rule = "Numeric" }, "rule passed");
//!
//! // With target
//! warn!(target: "bodymass::form", "Unknown unit: {}", "stone");
//! ```
//!
//! # Environment Variables
//!
//! - `BODYMASS_DEBUG=1` - Enable debug logging
//! - `BODYMASS_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `BODYMASS_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `BODYMASS_LOG_COLOR=1|0` - Enable/disable colors
//! - `BODYMASS_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `BODYMASS_LOG_MODULE=1|0` - Include the record target

use once_cell::sync::Lazy;
use std::env;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-rule decisions
    Trace = 0,
    /// Per-run summaries
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Nothing is written
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Timestamp, level, target and message with optional colors
    Pretty,
    /// Short single-line format
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    /// Minimum level written
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
    /// Whether the record target is printed
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Pretty,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Build a config from `BODYMASS_*` environment variables.
    ///
    /// Does not touch the global level; use [`init`] for that.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("BODYMASS_DEBUG").unwrap_or(false);

        let level = env::var("BODYMASS_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("BODYMASS_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let color = env_flag("BODYMASS_LOG_COLOR").unwrap_or_else(|| {
            env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        });

        Self {
            debug,
            level,
            format,
            color,
            timestamps: env_flag("BODYMASS_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            module_path: env_flag("BODYMASS_LOG_MODULE").unwrap_or(defaults.module_path),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize the logging system from the environment.
///
/// Called implicitly by the first record; runtime overrides made after
/// initialization are kept.
pub fn init() {
    Lazy::force(&CONFIG);
}

#[inline]
pub fn is_debug_enabled() -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Whether a record at `level` would be written.
#[inline]
pub fn is_enabled(level: Level) -> bool {
    is_level_enabled(level) || (level == Level::Debug && is_debug_enabled())
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set the minimum level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Log Output
// ============================================================================

/// Write a record without fields.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Write a record with key-value fields.
#[doc(hidden)]
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    if !is_enabled(level) {
        return;
    }

    let config = config();
    let line = match config.format {
        Format::Pretty => render_pretty(level, target, message, fields, config),
        Format::Compact => render_compact(level, target, message, fields, config),
        Format::Json => render_json(level, target, message, fields),
    };

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

fn render_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!(" {}={}", k, v))
        .collect()
}

fn render_pretty(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, String)],
    config: &LogConfig,
) -> String {
    let mut out = String::new();

    if config.timestamps {
        out.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
    }

    #[cfg(feature = "color")]
    if config.color {
        out.push_str(&format!("{:5} ", level.colored()));
    } else {
        out.push_str(&format!("{:5} ", level.as_str()));
    }
    #[cfg(not(feature = "color"))]
    out.push_str(&format!("{:5} ", level.as_str()));

    if config.module_path && !target.is_empty() {
        out.push_str(&format!("[{}] ", target));
    }

    out.push_str(message);
    out.push_str(&render_fields(fields));
    out
}

fn render_compact(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, String)],
    config: &LogConfig,
) -> String {
    let mut out = String::new();

    if config.timestamps {
        out.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
    }

    out.push(level.as_str().chars().next().unwrap_or('?'));
    out.push(' ');

    if config.module_path && !target.is_empty() {
        out.push_str(target);
        out.push_str(": ");
    }

    out.push_str(message);
    out.push_str(&render_fields(fields));
    out
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str, fields: &[(&str, String)]) -> String {
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Record<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        fields: BTreeMap<&'a str, &'a str>,
    }

    let record = Record {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
        fields: fields.iter().map(|(k, v)| (*k, v.as_str())).collect(),
    };

    serde_json::to_string(&record).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str, fields: &[(&str, String)]) -> String {
    let mut out = format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}""#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
    if !fields.is_empty() {
        let body: Vec<String> = fields
            .iter()
            .map(|(k, v)| format!(r#""{}":"{}""#, escape_json(k), escape_json(v)))
            .collect();
        out.push_str(&format!(r#","fields":{{{}}}"#, body.join(",")));
    }
    out.push('}');
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// `log` facade bridge
// ============================================================================

struct LogBridge;

impl ::log::Log for LogBridge {
    fn enabled(&self, metadata: &::log::Metadata<'_>) -> bool {
        is_enabled(from_log_level(metadata.level()))
    }

    fn log(&self, record: &::log::Record<'_>) {
        let level = from_log_level(record.level());
        if is_enabled(level) {
            log_fields(level, record.target(), &record.args().to_string(), &[]);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn from_log_level(level: ::log::Level) -> Level {
    match level {
        ::log::Level::Trace => Level::Trace,
        ::log::Level::Debug => Level::Debug,
        ::log::Level::Info => Level::Info,
        ::log::Level::Warn => Level::Warn,
        ::log::Level::Error => Level::Error,
    }
}

static BRIDGE: LogBridge = LogBridge;

/// Route records emitted through the `log` facade into this formatter.
///
/// Returns an error if another logger is already installed.
pub fn install_log_bridge() -> Result<(), ::log::SetLoggerError> {
    ::log::set_logger(&BRIDGE)?;
    ::log::set_max_level(::log::LevelFilter::Trace);
    Ok(())
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, { $($key:ident = $value:expr),* $(,)? }, $($arg:tt)+) => {
        if $crate::is_enabled($level) {
            $crate::log_fields(
                $level,
                $target,
                &format!($($arg)+),
                &[$((stringify!($key), ($value).to_string())),*],
            );
        }
    };
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, { $($key:ident = $value:expr),* $(,)? }, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), { $($key = $value),* }, $($arg)+)
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), $($arg)+)
    };
}

/// Log a trace record.
///
/// Only written when `BODYMASS_LOG_LEVEL=trace`.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug record.
///
/// Written when `BODYMASS_DEBUG=1` or `BODYMASS_LOG_LEVEL=debug`.
///
/// ```rust
/// use bodymass_log::debug;
///
/// debug!("Running validation");
/// debug!({ fields = 4 }, "Running validation");
/// debug!(target: "bodymass::cli", "Loaded {}", "form.toml");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber that follows the `BODYMASS_*` configuration.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let level = match current_level() {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(config.color))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse(" TRACE "), Some(Level::Trace));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("none"), Some(Level::Off));
        assert_eq!(Level::parse("verbose"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("Compact"), Some(Format::Compact));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_render_fields() {
        let fields = [("field", "weight".to_string()), ("rule", "Min".to_string())];
        assert_eq!(render_fields(&fields), " field=weight rule=Min");
        assert_eq!(render_fields(&[]), "");
    }

    #[test]
    fn test_compact_render_includes_target_and_fields() {
        let config = LogConfig {
            timestamps: false,
            ..LogConfig::default()
        };
        let line = render_compact(
            Level::Warn,
            "bodymass::form",
            "unknown unit",
            &[("unit", "stone".to_string())],
            &config,
        );
        assert_eq!(line, "W bodymass::form: unknown unit unit=stone");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_render() {
        let line = render_json(Level::Info, "t", "hello", &[("k", "v".to_string())]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "hello");
        assert_eq!(parsed["fields"]["k"], "v");
    }

    #[test]
    fn test_runtime_overrides() {
        let original_level = current_level();
        let original_debug = is_debug_enabled();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);
        assert!(!is_level_enabled(Level::Warn));

        set_debug(true);
        assert!(is_enabled(Level::Debug));

        set_debug(original_debug);
        set_level(original_level);
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!("debug {}", 1);
        info!(target: "test", "with target");
        warn!({ field = "weight" }, "with fields");
        error!(target: "test", { field = "height", index = 2 }, "both {}", "forms");
    }
}
