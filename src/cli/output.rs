//! Output formatting for read results
//!
//! JSON and YAML serialize the [`ProjectDescriptor`] as-is; the human format
//! is a sectioned listing.

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::project::ProjectDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, project: &ProjectDescriptor) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(project)
                .context("Failed to serialize project metadata to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(project)
                .context("Failed to serialize project metadata to YAML"),
            OutputFormat::Human => Ok(self.format_human(project)),
        }
    }

    fn format_human(&self, project: &ProjectDescriptor) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Project:   {}", project.path().display());
        let _ = writeln!(out, "Strategy:  {}", project.strategy());
        let frameworks = if project.target_frameworks().is_empty() {
            "(none)".to_string()
        } else {
            project.target_frameworks().join(", ")
        };
        let _ = writeln!(out, "Targets:   {}", frameworks);

        section(&mut out, "References", project.references().iter());
        section(&mut out, "Packages", project.packages().iter());
        section(
            &mut out,
            "Sources",
            project.sources().iter().map(|p| p.display()),
        );

        out
    }
}

fn section<T: std::fmt::Display>(out: &mut String, title: &str, items: impl ExactSizeIterator<Item = T>) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({}):", title, items.len());
    for item in items {
        let _ = writeln!(out, "  {}", item);
    }
}
