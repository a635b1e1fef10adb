//! MSBuild evaluation strategy
//!
//! Evaluates a descriptor with the .NET SDK's MSBuild in `-getItem` /
//! `-getProperty` mode, which runs evaluation only (no targets) and prints the
//! requested items and properties as JSON. Any failure here is recoverable:
//! the caller falls back to the markup reader.

use super::paths::{clean, resolve_include};
use crate::config::ReaderConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace};

const MAX_ENGINE_OUTPUT: usize = 2048;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Evaluation engine is disabled")]
    Disabled,

    #[error("Evaluation engine not found: {0}")]
    EngineNotFound(PathBuf),

    #[error("Failed to start evaluation engine: {0}")]
    Spawn(#[source] io::Error),

    #[error("Evaluation engine failed ({status}): {output}")]
    EngineFailed { status: String, output: String },

    #[error("Evaluation engine produced unreadable output: {0}")]
    InvalidOutput(#[source] serde_json::Error),
}

impl EvaluationError {
    /// Whether the engine is simply absent on this host, as opposed to having
    /// tried and failed on this descriptor.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EvaluationError::Disabled | EvaluationError::EngineNotFound(_)
        )
    }
}

/// Item lists as resolved by a real evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluatedProject {
    pub references: Vec<String>,
    pub sources: Vec<PathBuf>,
    pub target_frameworks: Vec<String>,
}

/// A build-evaluation engine.
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &str;

    /// Evaluates the descriptor at `path` (absolute).
    fn evaluate(&self, path: &Path) -> Result<EvaluatedProject, EvaluationError>;
}

/// Evaluator for hosts without an engine; always reports [`EvaluationError::Disabled`].
pub struct DisabledEvaluator;

impl Evaluator for DisabledEvaluator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn evaluate(&self, _path: &Path) -> Result<EvaluatedProject, EvaluationError> {
        Err(EvaluationError::Disabled)
    }
}

/// Runs `dotnet msbuild` as a child process.
pub struct DotnetEvaluator {
    dotnet: PathBuf,
    source_extension: String,
}

impl DotnetEvaluator {
    pub fn new(dotnet: impl Into<PathBuf>, source_extension: impl Into<String>) -> Self {
        Self {
            dotnet: dotnet.into(),
            source_extension: source_extension.into(),
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(&config.dotnet_path, &config.source_extension)
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.dotnet);
        command
            .arg("msbuild")
            .arg(path)
            .args([
                "-nologo",
                "-getItem:Compile",
                "-getItem:Reference",
                "-getProperty:TargetFramework",
                "-getProperty:TargetFrameworks",
            ])
            .env("DOTNET_CLI_TELEMETRY_OPTOUT", "1")
            .env("DOTNET_NOLOGO", "1")
            .stdin(Stdio::null());
        command
    }
}

impl Evaluator for DotnetEvaluator {
    fn name(&self) -> &str {
        "dotnet msbuild"
    }

    fn evaluate(&self, path: &Path) -> Result<EvaluatedProject, EvaluationError> {
        debug!(path = %path.display(), dotnet = %self.dotnet.display(), "Evaluating project");

        let output = self.command(path).output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EvaluationError::EngineNotFound(self.dotnet.clone()),
            _ => EvaluationError::Spawn(e),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            // MSBuild reports evaluation errors on stdout.
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() { &stdout } else { &stderr };
            return Err(EvaluationError::EngineFailed {
                status: output.status.to_string(),
                output: truncate(detail.trim(), MAX_ENGINE_OUTPUT),
            });
        }

        let project_dir = path.parent().unwrap_or(Path::new(""));
        decode(&stdout, project_dir, &self.source_extension)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MsBuildOutput {
    #[serde(rename = "Properties", default)]
    properties: HashMap<String, String>,
    #[serde(rename = "Items", default)]
    items: HashMap<String, Vec<MsBuildItem>>,
}

#[derive(Debug, Deserialize)]
struct MsBuildItem {
    #[serde(rename = "Identity")]
    identity: String,
    #[serde(rename = "FullPath", default)]
    full_path: Option<String>,
}

impl MsBuildOutput {
    fn items(&self, kind: &str) -> &[MsBuildItem] {
        self.items.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn property(&self, name: &str) -> &str {
        self.properties.get(name).map(|v| v.trim()).unwrap_or("")
    }
}

/// Decodes `-getItem`/`-getProperty` JSON into item lists.
fn decode(
    stdout: &str,
    project_dir: &Path,
    source_extension: &str,
) -> Result<EvaluatedProject, EvaluationError> {
    let json = json_start(stdout);
    let output: MsBuildOutput =
        serde_json::from_str(json).map_err(EvaluationError::InvalidOutput)?;

    let references = output
        .items("Reference")
        .iter()
        .map(|item| item.identity.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    let sources = output
        .items("Compile")
        .iter()
        .map(|item| match &item.full_path {
            Some(full) if !full.is_empty() => clean(Path::new(full)),
            _ => resolve_include(project_dir, &item.identity),
        })
        .filter(|p| p.to_string_lossy().ends_with(source_extension))
        .collect();

    let frameworks = match output.property("TargetFrameworks") {
        "" => output.property("TargetFramework"),
        multi => multi,
    };
    let target_frameworks = frameworks
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let project = EvaluatedProject {
        references,
        sources,
        target_frameworks,
    };
    trace!(?project, "Decoded evaluation output");
    Ok(project)
}

/// Skips anything printed ahead of the JSON object, such as SDK banners,
/// by starting at the first line that opens with `{`.
fn json_start(stdout: &str) -> &str {
    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        if line.trim_start().starts_with('{') {
            return &stdout[offset..];
        }
        offset += line.len();
    }
    stdout
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
