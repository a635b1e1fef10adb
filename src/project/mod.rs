//! MSBuild project descriptor reading
//!
//! A descriptor is read by two strategies. The evaluation engine
//! ([`evaluation`]) resolves properties, conditions, imports and globs the way
//! a real build would. When it cannot run, the markup reader ([`markup`])
//! parses the XML directly and approximates the result without variable
//! expansion. [`ProjectReader`] tries them in that order and hands back a
//! single immutable [`ProjectDescriptor`].
//!
//! ```no_run
//! use projmeta::ProjectDescriptor;
//!
//! let project = ProjectDescriptor::open("/src/App/App.csproj")?;
//! for source in project.sources() {
//!     println!("{}", source.display());
//! }
//! # Ok::<(), projmeta::ProjectError>(())
//! ```

pub mod descriptor;
pub mod evaluation;
pub mod markup;
pub mod paths;
pub mod query;

pub use descriptor::{ProjectDescriptor, ProjectReader, ReadStrategy};
pub use evaluation::{
    DisabledEvaluator, DotnetEvaluator, EvaluatedProject, EvaluationError, Evaluator,
};
pub use markup::{LegacyProject, MarkupProject, MarkupReader, SdkProject};

use serde::Serialize;
use std::fmt;

/// Descriptor dialect, decided by the root `Sdk` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStyle {
    /// `<Project Sdk="...">`, unnamespaced, implicit source globbing
    Sdk,
    /// Pre-SDK project in the MSBuild 2003 namespace with explicit item lists
    Legacy,
}

impl fmt::Display for ProjectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStyle::Sdk => write!(f, "sdk"),
            ProjectStyle::Legacy => write!(f, "legacy"),
        }
    }
}

/// A `<PackageReference>` with both name and version present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageReference {
    pub name: String,
    pub version: String,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
