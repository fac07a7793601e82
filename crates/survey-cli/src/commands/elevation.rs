use crate::config::Config;
use crate::project::{to_json, OpenProject};
use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use survey_core::CellTerrain;

use super::CellTarget;

/// Enter or clear a cell's elevation range.
#[derive(Args, Debug)]
pub struct ElevationArgs {
    pub project: PathBuf,

    #[command(flatten)]
    pub target: CellTarget,

    /// Lowest terrain elevation in the cell, meters
    #[arg(long, allow_hyphen_values = true, requires = "max")]
    pub min: Option<f64>,

    /// Highest terrain elevation in the cell, meters
    #[arg(long, allow_hyphen_values = true, requires = "min")]
    pub max: Option<f64>,

    /// Remove the elevation input
    #[arg(long, conflicts_with_all = ["min", "max"])]
    pub clear: bool,
}

pub fn run(args: ElevationArgs, config: &Config) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let id = args.target.cell_id(open.project.grid.as_ref())?;
    let engine = &mut open.project.engine;

    let terrain = match (args.min, args.max) {
        _ if args.clear => {
            engine.clear_cell_elevation(&id)?;
            engine.cell_terrain(&id)
        }
        (Some(min), Some(max)) => Some(engine.set_cell_elevation(&id, min, max)?),
        _ => bail!("pass --min and --max, or --clear"),
    };

    if let Some(CellTerrain::Flagged(range)) = terrain {
        eprintln!("warning: cell {id}: {range}; left out of area and outline until fixed");
    }
    open.save(config.pretty_json)?;
    println!("{}", to_json(&terrain, true)?);
    Ok(())
}
