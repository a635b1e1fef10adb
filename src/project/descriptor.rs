use super::evaluation::{DisabledEvaluator, DotnetEvaluator, Evaluator};
use super::markup::{self, MarkupReader};
use super::paths::absolutize;
use super::{PackageReference, ProjectStyle};
use crate::config::ReaderConfig;
use crate::error::ProjectError;
use crate::fs::{FileSystem, RealFileSystem};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which strategy produced a descriptor's item lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStrategy {
    Evaluation,
    Markup(ProjectStyle),
}

impl std::fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadStrategy::Evaluation => write!(f, "evaluation"),
            ReadStrategy::Markup(style) => write!(f, "markup ({})", style),
        }
    }
}

/// Build metadata of one project file. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    path: PathBuf,
    directory: PathBuf,
    strategy: ReadStrategy,
    references: Vec<String>,
    packages: Vec<PackageReference>,
    sources: Vec<PathBuf>,
    target_frameworks: Vec<String>,
}

impl ProjectDescriptor {
    /// Reads `path` with the real filesystem and settings from the environment.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        ProjectReader::from_config(ReaderConfig::default()).read(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder containing the project file; relative includes resolve against it.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn packages(&self) -> &[PackageReference] {
        &self.packages
    }

    /// Absolute source paths. A file both listed explicitly and found by the
    /// directory scan appears twice.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn target_frameworks(&self) -> &[String] {
        &self.target_frameworks
    }

    /// `ProjectReference` items are not resolved yet; always empty.
    pub fn project_references(&self) -> &[PathBuf] {
        &[]
    }
}

/// Reads descriptors: evaluation first, markup on any evaluation failure.
///
/// Holds no per-read state, so one reader can serve many threads.
pub struct ProjectReader {
    fs: Arc<dyn FileSystem>,
    evaluator: Box<dyn Evaluator>,
    config: ReaderConfig,
}

impl ProjectReader {
    pub fn new(fs: Arc<dyn FileSystem>, evaluator: Box<dyn Evaluator>, config: ReaderConfig) -> Self {
        Self {
            fs,
            evaluator,
            config,
        }
    }

    /// Real filesystem, with `dotnet msbuild` unless evaluation is disabled.
    pub fn from_config(config: ReaderConfig) -> Self {
        let evaluator: Box<dyn Evaluator> = if config.evaluation_enabled {
            Box::new(DotnetEvaluator::from_config(&config))
        } else {
            Box::new(DisabledEvaluator)
        };
        Self::new(Arc::new(RealFileSystem::new()), evaluator, config)
    }

    /// Reader that never runs the evaluation engine.
    pub fn markup_only(fs: Arc<dyn FileSystem>, config: ReaderConfig) -> Self {
        Self::new(fs, Box::new(DisabledEvaluator), config)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Result<ProjectDescriptor, ProjectError> {
        let path = path.as_ref();
        let path = absolutize(path).map_err(|e| ProjectError::read(path, e.into()))?;
        let directory = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf);
        let Some(directory) = directory else {
            return Err(ProjectError::InvalidPath { path });
        };

        if !self.fs.is_file(&path) {
            return Err(ProjectError::read(
                &path,
                anyhow::anyhow!("Project file not found: {:?}", path),
            ));
        }

        let evaluated = match self.evaluator.evaluate(&path) {
            Ok(project) => Some(project),
            Err(err) if err.is_unavailable() => {
                debug!(path = %path.display(), reason = %err, "Evaluation unavailable, reading markup");
                None
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    evaluator = self.evaluator.name(),
                    error = %err,
                    "Evaluation failed, falling back to markup"
                );
                None
            }
        };

        let reader = MarkupReader::new(self.fs.as_ref(), &self.config);
        let text = reader.load(&path)?;
        let doc = markup::parse_document(&path, &text)?;
        let packages = markup::packages(&path, &doc)?;

        let (strategy, references, sources, target_frameworks) = match evaluated {
            Some(project) => (
                ReadStrategy::Evaluation,
                project.references,
                project.sources,
                project.target_frameworks,
            ),
            None => {
                let project = reader.extract(&path, &doc)?;
                let strategy = ReadStrategy::Markup(project.style());
                let (references, sources, target_frameworks) = project.into_parts();
                (strategy, references, sources, target_frameworks)
            }
        };

        info!(
            path = %path.display(),
            %strategy,
            references = references.len(),
            packages = packages.len(),
            sources = sources.len(),
            frameworks = target_frameworks.len(),
            "Read project"
        );

        Ok(ProjectDescriptor {
            path,
            directory,
            strategy,
            references,
            packages,
            sources,
            target_frameworks,
        })
    }
}
