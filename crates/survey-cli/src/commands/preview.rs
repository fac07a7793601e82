use crate::project::OpenProject;
use crate::svg;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Render the selection and merged outline to an SVG file.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    pub project: PathBuf,

    #[arg(long, short)]
    pub out: PathBuf,

    /// Length of the longer picture side in pixels
    #[arg(long, default_value_t = 800.0)]
    pub size_px: f64,
}

pub fn run(args: PreviewArgs) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let project = &mut open.project;

    let cells = project.engine.cell_views();
    let outline = project.engine.merged_outline();
    let picture = svg::render(&cells, &outline, &project.style, args.size_px);

    fs::write(&args.out, picture)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}
