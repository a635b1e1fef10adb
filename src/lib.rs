//! projmeta - build metadata extraction for MSBuild projects
//!
//! Lists the compiled sources, assembly references, package references and
//! target frameworks of a `.csproj`-style project without building it, for
//! tools such as static analyzers and dependency graph builders.
//!
//! # Core Concepts
//!
//! - **Evaluation**: `dotnet msbuild` resolves the project exactly as a build
//!   would (properties, conditions, imports, globs)
//! - **Markup fallback**: when evaluation is unavailable or fails, the project
//!   XML is read directly, distinguishing SDK-style from legacy projects
//! - **Descriptor**: the immutable result, whichever strategy produced it
//!
//! # Example Usage
//!
//! ```no_run
//! use projmeta::{ProjectReader, ReaderConfig};
//!
//! let reader = ProjectReader::from_config(ReaderConfig::default());
//! let project = reader.read("src/App/App.csproj")?;
//!
//! println!("{} via {}", project.path().display(), project.strategy());
//! for package in project.packages() {
//!     println!("  {}", package);
//! }
//! # Ok::<(), projmeta::ProjectError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod project;
pub mod util;

pub use config::{ConfigError, ReaderConfig};
pub use error::ProjectError;
pub use project::{
    EvaluationError, Evaluator, MarkupProject, PackageReference, ProjectDescriptor, ProjectReader,
    ProjectStyle, ReadStrategy,
};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
