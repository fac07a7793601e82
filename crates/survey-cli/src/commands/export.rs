use crate::config::Config;
use crate::project::{to_json, write_json, OpenProject};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Write the selection as a GeoJSON FeatureCollection.
#[derive(Args, Debug)]
pub struct ExportArgs {
    pub project: PathBuf,

    /// Output file; stdout when omitted
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub fn run(args: ExportArgs, config: &Config) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let collection = open.project.engine.feature_collection();

    match args.out {
        Some(path) => {
            write_json(&path, &collection, config.pretty_json)?;
            tracing::info!(
                out = %path.display(),
                features = collection.features.len(),
                "exported feature collection"
            );
        }
        None => println!("{}", to_json(&collection, config.pretty_json)?),
    }
    Ok(())
}
