//! Structured logging setup for projmeta
//!
//! The library only emits `tracing` events; this module is for binaries that
//! want a subscriber. Output goes to stderr so stdout stays clean for
//! serialized metadata.
//!
//! # Example
//!
//! ```no_run
//! use projmeta::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!("ready");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for projmeta's own events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target (e.g., projmeta::project::markup)
    pub include_target: bool,

    /// Attach `file:line` to each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with source locations, for log collectors.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }

    /// Reads `PROJMETA_LOG_LEVEL` (default info) and `PROJMETA_LOG_JSON`.
    /// JSON output uses the [`production`](Self::production) layout.
    pub fn from_env() -> Self {
        let level = env::var("PROJMETA_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);
        let use_json = env::var("PROJMETA_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let base = if use_json {
            Self::production()
        } else {
            Self::default()
        };
        Self { level, ..base }
    }
}

/// Parses a log level (case-insensitive), defaulting to INFO.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Unknown log level '{}', using info", level_str);
            Level::INFO
        }
    }
}

fn crate_directive(level: Level) -> Option<Directive> {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level).parse().ok()
}

/// Installs the global subscriber. Only the first call has any effect.
///
/// `RUST_LOG`, when set, takes precedence over `config.level`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            if let Some(directive) = crate_directive(config.level) {
                filter = filter.add_directive(directive);
            }
        }

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}

/// Installs a subscriber configured by [`LoggingConfig::from_env`].
pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
