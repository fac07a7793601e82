use crate::config::Config;
use crate::project::OpenProject;
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use survey_core::{CoordinateSystem, FlightParameters, SurveyEngine, SurveyGrid, SurveyProject};

use super::parse_point;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CrsArg {
    /// Longitude/latitude in decimal degrees
    Geographic,
    /// Easting/northing in meters
    Projected,
}

impl From<CrsArg> for CoordinateSystem {
    fn from(value: CrsArg) -> Self {
        match value {
            CrsArg::Geographic => CoordinateSystem::Geographic,
            CrsArg::Projected => CoordinateSystem::Projected,
        }
    }
}

/// Create a new project with default flight parameters and a survey grid.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project file to create
    pub project: PathBuf,

    #[arg(long, value_enum, default_value_t = CrsArg::Geographic)]
    pub crs: CrsArg,

    /// Grid origin (minimum corner) as x,y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub origin: [f64; 2],

    #[arg(long, default_value_t = 10)]
    pub cols: u32,

    #[arg(long, default_value_t = 10)]
    pub rows: u32,

    /// Cell edge in meters [default: SURVEY_CELL_SIZE_M or 1000]
    #[arg(long)]
    pub cell_size_m: Option<f64>,

    /// Overwrite an existing project
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, config: &Config) -> Result<()> {
    if args.project.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            args.project.display()
        );
    }

    let crs = CoordinateSystem::from(args.crs);
    let cell_size_m = args.cell_size_m.unwrap_or(config.cell_size_m);
    let grid = SurveyGrid::with_cell_size_m(args.origin, cell_size_m, args.cols, args.rows, crs)
        .context("invalid grid")?;
    let engine = SurveyEngine::new(FlightParameters::default(), crs)?;

    let mut open = OpenProject::new(
        &args.project,
        SurveyProject {
            engine,
            grid: Some(grid),
            ..SurveyProject::default()
        },
    );
    open.save(config.pretty_json)?;
    println!(
        "Created {} ({}x{} cells of {} m)",
        args.project.display(),
        args.cols,
        args.rows,
        cell_size_m
    );
    Ok(())
}
