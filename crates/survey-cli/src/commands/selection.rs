use crate::config::Config;
use crate::project::OpenProject;
use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use survey_core::{CellId, CellShape};

use super::{parse_point, parse_rect, CellTarget};

/// Add cells to the selection.
#[derive(Args, Debug)]
pub struct SelectArgs {
    pub project: PathBuf,

    #[command(flatten)]
    pub target: CellTarget,

    /// Free rectangle min_x,min_y,max_x,max_y (no grid needed)
    #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub rect: Option<CellShape>,

    /// Vertex x,y of a survey area; every grid cell whose centre lies inside
    /// is selected. Repeat for each vertex.
    #[arg(long = "vertex", value_parser = parse_point, allow_hyphen_values = true)]
    pub vertices: Vec<[f64; 2]>,

    /// Deselect the targeted cell instead if it is already selected
    #[arg(long)]
    pub toggle: bool,
}

/// Remove a cell from the selection.
#[derive(Args, Debug)]
pub struct DeselectArgs {
    pub project: PathBuf,

    #[command(flatten)]
    pub target: CellTarget,
}

pub fn select(args: SelectArgs, config: &Config) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let project = &mut open.project;

    let shapes: Vec<CellShape> = if !args.vertices.is_empty() {
        match &project.grid {
            Some(grid) => grid
                .cells_within(&args.vertices)
                .into_iter()
                .map(|(_, shape)| shape)
                .collect(),
            None => bail!("project has no grid; --vertex needs one"),
        }
    } else if let Some(rect) = args.rect {
        vec![rect]
    } else {
        vec![args.target.shape(project.grid.as_ref())?]
    };

    let mut added = 0;
    let mut removed = 0;
    for shape in shapes {
        if args.toggle {
            if project.engine.toggle_cell(shape)? {
                added += 1;
            } else {
                removed += 1;
            }
        } else {
            let id = shape.cell_id().map_err(|d| anyhow::anyhow!("{d:?}"))?;
            if project.engine.select_cell(id, shape)? {
                added += 1;
            }
        }
    }

    open.save(config.pretty_json)?;
    println!(
        "{added} cell(s) selected, {removed} deselected, {} in selection",
        open.project.engine.len()
    );
    Ok(())
}

pub fn deselect(args: DeselectArgs, config: &Config) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let id: CellId = args.target.cell_id(open.project.grid.as_ref())?;
    if !open.project.engine.deselect_cell(&id) {
        bail!("cell {id} is not selected");
    }
    open.save(config.pretty_json)?;
    println!("Deselected {id}, {} in selection", open.project.engine.len());
    Ok(())
}
