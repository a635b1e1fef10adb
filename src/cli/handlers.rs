use super::commands::ReadArgs;
use super::output::OutputFormatter;
use crate::config::ReaderConfig;
use crate::project::ProjectReader;
use anyhow::{Context, Result};
use std::fs;
use tracing::debug;

/// Runs `projmeta read`, returning the process exit code.
pub fn handle_read(args: &ReadArgs) -> i32 {
    match run_read(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_read(args: &ReadArgs) -> Result<()> {
    let mut config = ReaderConfig::default();
    if args.no_evaluate {
        config.evaluation_enabled = false;
    }
    if let Some(dotnet) = &args.dotnet {
        config.dotnet_path = dotnet.clone();
    }
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);

    let project = ProjectReader::from_config(config).read(&args.project)?;
    let rendered = OutputFormatter::new(args.format.into()).format(&project)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output to {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
