use crate::project::{to_json, OpenProject};
use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use survey_core::units::present;

/// Print footprint, terrain statistics, outline status and mission plan.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    pub project: PathBuf,

    /// Also list every selected cell
    #[arg(long)]
    pub cells: bool,
}

pub fn run(args: SummaryArgs) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let engine = &mut open.project.engine;

    let footprint = engine.footprint().rounded();
    let terrain = engine.terrain_summary();
    let outline = match engine.outline_result() {
        Ok(rings) => json!({ "rings": rings.len() }),
        Err(err) => json!({ "rings": 0, "error": err.to_string() }),
    };
    let mut summary = json!({
        "saved_at": open.saved_at.map(|t| t.to_rfc3339()),
        "crs": engine.crs(),
        "selected_cells": engine.len(),
        "selected_area_m2": present(engine.selected_area_m2()),
        "footprint": footprint,
        "terrain": terrain,
        "outline": outline,
        "mission": engine.mission_plan(),
    });
    if args.cells {
        summary["cells"] = serde_json::to_value(engine.cell_views())?;
    }

    println!("{}", to_json(&summary, true)?);
    Ok(())
}
