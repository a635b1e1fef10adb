use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Extract build metadata from MSBuild project files without building them
#[derive(Parser, Debug)]
#[command(
    name = "projmeta",
    about = "Extract build metadata from MSBuild project files without building them",
    version,
    author,
    long_about = "projmeta lists the compiled sources, assembly references, package references \
                  and target frameworks of a .csproj-style project. It asks `dotnet msbuild` to \
                  evaluate the project and falls back to reading the XML directly when the \
                  .NET SDK is missing or evaluation fails."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Read metadata from a project file",
        long_about = "Reads a project file and prints its sources, references, packages and \
                      target frameworks.\n\n\
                      Examples:\n  \
                      projmeta read src/App/App.csproj\n  \
                      projmeta read App.csproj --format json\n  \
                      projmeta read App.csproj --no-evaluate -o app.yaml --format yaml"
    )]
    Read(ReadArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    #[arg(value_name = "PATH", help = "Path to the project file")]
    pub project: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Skip the MSBuild evaluation engine and read the XML directly")]
    pub no_evaluate: bool,

    #[arg(long, value_name = "PATH", help = "Path to the dotnet executable")]
    pub dotnet: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
