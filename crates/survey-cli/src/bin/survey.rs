//! survey - plan an aerial photogrammetry survey from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use survey_cli::commands::{
    elevation::{self, ElevationArgs},
    export::{self, ExportArgs},
    init::{self, InitArgs},
    params::{self, ParamsArgs},
    preview::{self, PreviewArgs},
    selection::{self, DeselectArgs, SelectArgs},
    summary::{self, SummaryArgs},
};
use survey_cli::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// tracing filter directive [default: SURVEY_LOG or survey_cli=info,survey_core=info]
    #[arg(long, global = true)]
    log: Option<String>,

    /// Write compact JSON regardless of SURVEY_PRETTY_JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project with a survey grid
    Init(InitArgs),
    /// Show or edit flight parameters
    Params(ParamsArgs),
    /// Select grid cells, a rectangle, or every cell inside an area
    Select(SelectArgs),
    Deselect(DeselectArgs),
    /// Enter a cell's terrain elevation range
    Elevation(ElevationArgs),
    Summary(SummaryArgs),
    /// Export GeoJSON
    Export(ExportArgs),
    /// Render an SVG preview
    Preview(PreviewArgs),
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_directive)
        .with_context(|| format!("invalid log directive {:?}", config.log_directive))?;
    let json = config.log_json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(directive) = cli.log {
        config.log_directive = directive;
    }
    if cli.compact {
        config.pretty_json = false;
    }
    init_tracing(&config)?;
    tracing::debug!(?config, "starting");

    match cli.command {
        Command::Init(args) => init::run(args, &config),
        Command::Params(args) => params::run(args, &config),
        Command::Select(args) => selection::select(args, &config),
        Command::Deselect(args) => selection::deselect(args, &config),
        Command::Elevation(args) => elevation::run(args, &config),
        Command::Summary(args) => summary::run(args),
        Command::Export(args) => export::run(args, &config),
        Command::Preview(args) => preview::run(args),
    }
}
