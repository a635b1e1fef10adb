//! Configuration for project readers
//!
//! `ReaderConfig::default()` loads settings from environment variables with
//! fallback defaults. The readers themselves never touch the environment; they
//! only see the resolved struct.
//!
//! # Environment Variables
//!
//! - `PROJMETA_EVALUATE`: Use the MSBuild evaluation engine (true|false) - default: "true"
//! - `PROJMETA_DOTNET`: Path to the `dotnet` executable - default: "dotnet"
//! - `PROJMETA_SOURCE_EXTENSION`: Compiled source extension - default: ".cs"
//! - `PROJMETA_SCAN_EXCLUDE`: Comma-separated directory names skipped by the
//!   implicit source scan - default: none
//!
//! Logging is configured separately, see [`crate::util::logging`].

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_EVALUATION_ENABLED: bool = true;
const DEFAULT_DOTNET_PATH: &str = "dotnet";
const DEFAULT_SOURCE_EXTENSION: &str = ".cs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Try the evaluation engine before falling back to markup parsing
    pub evaluation_enabled: bool,
    pub dotnet_path: PathBuf,
    /// Suffix, including the leading dot, of compiled source files
    pub source_extension: String,
    /// Directory names the implicit source scan does not descend into
    pub scan_exclude_dirs: Vec<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        let evaluation_enabled = env::var("PROJMETA_EVALUATE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_EVALUATION_ENABLED);

        let dotnet_path = env::var("PROJMETA_DOTNET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTNET_PATH));

        let source_extension = env::var("PROJMETA_SOURCE_EXTENSION")
            .unwrap_or_else(|_| DEFAULT_SOURCE_EXTENSION.to_string());

        let scan_exclude_dirs = env::var("PROJMETA_SCAN_EXCLUDE")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        Self {
            evaluation_enabled,
            dotnet_path,
            source_extension,
            scan_exclude_dirs,
        }
    }
}

impl ReaderConfig {
    /// Checks that the source extension is a dotted suffix and the dotnet
    /// path is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_extension.starts_with('.') || self.source_extension.len() < 2 {
            return Err(ConfigError::ValidationFailed(format!(
                "Source extension must look like '.cs', got '{}'",
                self.source_extension
            )));
        }

        if self.dotnet_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "dotnet path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.scan_exclude_dirs.iter().any(|d| d == name)
    }
}

impl fmt::Display for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Projmeta Configuration:")?;
        writeln!(f, "  Evaluation: {}", self.evaluation_enabled)?;
        writeln!(f, "  dotnet: {}", self.dotnet_path.display())?;
        writeln!(f, "  Source Extension: {}", self.source_extension)?;
        if self.scan_exclude_dirs.is_empty() {
            writeln!(f, "  Scan Exclude: (none)")?;
        } else {
            writeln!(f, "  Scan Exclude: {}", self.scan_exclude_dirs.join(", "))?;
        }
        Ok(())
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
