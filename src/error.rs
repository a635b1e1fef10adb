//! Errors surfaced by project descriptor reads.
//!
//! Evaluation engine failures never appear here: they are recovered by falling
//! back to the markup reader (see [`crate::project::EvaluationError`]).

use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to read project file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Failed to parse project file {path} as XML: {source}")]
    MarkupLoad {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("<{element}> at {path}:{line}:{column} is missing required '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        element: String,
        attribute: String,
        line: u32,
        column: u32,
    },

    #[error("Project file path has no parent directory: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Failed to scan {path} for source files: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl ProjectError {
    /// The descriptor (or scanned directory) this error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ProjectError::Read { path, .. }
            | ProjectError::MarkupLoad { path, .. }
            | ProjectError::MissingAttribute { path, .. }
            | ProjectError::InvalidPath { path }
            | ProjectError::Scan { path, .. } => path,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        ProjectError::Read {
            path: path.into(),
            source: err.into(),
        }
    }

    pub(crate) fn scan(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        ProjectError::Scan {
            path: path.into(),
            source: err.into(),
        }
    }
}
