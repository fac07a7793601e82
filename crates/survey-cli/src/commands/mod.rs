//! One module per `survey` subcommand. Each exposes its clap arguments and a
//! `run` function.

pub mod elevation;
pub mod export;
pub mod init;
pub mod params;
pub mod preview;
pub mod selection;
pub mod summary;

use anyhow::{bail, Context, Result};
use clap::Args;
use survey_core::{CellId, CellShape, GridIndex, SurveyGrid};

/// Parse `x,y` into a coordinate pair.
pub fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let values = parse_numbers(s)?;
    match values.as_slice() {
        [x, y] => Ok([*x, *y]),
        _ => Err(format!("expected x,y but got {s:?}")),
    }
}

/// Parse `min_x,min_y,max_x,max_y` into a rectangle.
pub fn parse_rect(s: &str) -> Result<CellShape, String> {
    let values = parse_numbers(s)?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(CellShape::Rectangle {
            min: [*x0, *y0],
            max: [*x1, *y1],
        }),
        _ => Err(format!("expected min_x,min_y,max_x,max_y but got {s:?}")),
    }
}

fn parse_numbers(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{part:?} is not a finite number"))
        })
        .collect()
}

/// Which cell a command acts on: an explicit identity, a grid address, or a
/// map position on the grid.
#[derive(Args, Debug, Clone, Default)]
pub struct CellTarget {
    /// Cell identity as printed by `summary`
    #[arg(long)]
    pub id: Option<String>,

    /// Grid column (with --row)
    #[arg(long, requires = "row")]
    pub col: Option<u32>,

    /// Grid row (with --col)
    #[arg(long, requires = "col")]
    pub row: Option<u32>,

    /// Map position x,y; picks the grid cell underneath
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub at: Option<[f64; 2]>,
}

impl CellTarget {
    /// Shape of the targeted grid cell.
    pub fn shape(&self, grid: Option<&SurveyGrid>) -> Result<CellShape> {
        let grid = grid.context("project has no grid to look the cell up in")?;
        let index = self.index_on(grid)?;
        grid.cell(index)
            .with_context(|| format!("cell ({}, {}) is outside the grid", index.col, index.row))
    }

    /// Identity of the targeted cell.
    pub fn cell_id(&self, grid: Option<&SurveyGrid>) -> Result<CellId> {
        if let Some(id) = &self.id {
            return Ok(CellId::from(id.as_str()));
        }
        let shape = self.shape(grid)?;
        shape
            .cell_id()
            .map_err(|defect| anyhow::anyhow!("grid cell is malformed: {defect:?}"))
    }

    fn index_on(&self, grid: &SurveyGrid) -> Result<GridIndex> {
        match (self.col, self.row, self.at) {
            (Some(col), Some(row), _) => Ok(GridIndex { col, row }),
            (_, _, Some([x, y])) => grid
                .cell_at(x, y)
                .with_context(|| format!("({x}, {y}) is outside the grid")),
            _ => bail!("choose a grid cell with --col/--row or --at"),
        }
    }
}
