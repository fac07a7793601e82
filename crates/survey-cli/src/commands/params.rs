use crate::config::Config;
use crate::project::{to_json, OpenProject};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use survey_core::{AirportLocation, FlightParametersUpdate};

use super::parse_point;

/// Show or edit flight parameters and print the derived footprint.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    pub project: PathBuf,

    #[arg(long)]
    pub sensor_width_px: Option<f64>,
    #[arg(long)]
    pub sensor_height_px: Option<f64>,
    #[arg(long)]
    pub pixel_pitch_um: Option<f64>,
    #[arg(long)]
    pub focal_length_mm: Option<f64>,
    #[arg(long)]
    pub image_scale: Option<f64>,
    #[arg(long)]
    pub forward_overlap_pct: Option<f64>,
    #[arg(long)]
    pub side_overlap_pct: Option<f64>,
    #[arg(long)]
    pub speed_kmh: Option<f64>,

    /// Departure airport as lat,lon
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub airport: Option<[f64; 2]>,

    /// Remove the departure airport
    #[arg(long, conflicts_with = "airport")]
    pub no_airport: bool,
}

impl ParamsArgs {
    fn update(&self) -> FlightParametersUpdate {
        FlightParametersUpdate {
            sensor_width_px: self.sensor_width_px,
            sensor_height_px: self.sensor_height_px,
            pixel_pitch_um: self.pixel_pitch_um,
            focal_length_mm: self.focal_length_mm,
            image_scale: self.image_scale,
            forward_overlap_pct: self.forward_overlap_pct,
            side_overlap_pct: self.side_overlap_pct,
            speed_kmh: self.speed_kmh,
            airport: self.airport.map(|[lat, lon]| AirportLocation { lat, lon }),
            clear_airport: self.no_airport,
        }
    }
}

pub fn run(args: ParamsArgs, config: &Config) -> Result<()> {
    let mut open = OpenProject::load(&args.project)?;
    let update = args.update();

    let footprint = if update.is_empty() {
        open.project.engine.footprint()
    } else {
        let footprint = open.project.engine.set_flight_parameters(&update)?;
        open.save(config.pretty_json)?;
        footprint
    };

    if footprint.orientation_warning {
        eprintln!("warning: sensor height exceeds sensor width; check camera orientation");
    }
    println!("{}", to_json(&footprint.rounded(), true)?);
    Ok(())
}
