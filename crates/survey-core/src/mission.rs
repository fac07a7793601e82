//! Flight-line layout and effort estimate for the selected area.
//!
//! Lines run east-west across the outline's extent, spaced by the inter-path
//! basis By; exposures along a line are spaced by Bx. Distances use a local
//! flat-earth scale, which is accurate enough at survey scale.

use crate::engine::SurveyEngine;
use crate::geometry::{extent, Extent};
use crate::models::{AirportLocation, CoordinateSystem, DerivedFootprint, FlightParameters, Ring};
use crate::units::{lat_to_meters, lon_to_meters};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionPlan {
    pub flight_lines: u32,
    pub exposures_per_line: u32,
    pub total_exposures: u32,
    pub line_length_m: f64,
    pub line_spacing_m: f64,
    pub exposure_spacing_m: f64,
    /// Lines plus the turn legs between them
    pub survey_distance_m: f64,
    /// Airport to area centre and back; geographic coordinates only
    pub ferry_distance_m: Option<f64>,
    pub flight_time_h: f64,
}

fn outline_extent(outline: &[Ring]) -> Option<Extent> {
    outline
        .iter()
        .filter_map(|ring| extent(ring))
        .reduce(|a, b| a.union(&b))
}

fn ferry_distance_m(airport: &AirportLocation, center: [f64; 2]) -> f64 {
    let ref_lat = (airport.lat + center[1]) / 2.0;
    let dx = lon_to_meters(center[0] - airport.lon, ref_lat);
    let dy = lat_to_meters(center[1] - airport.lat, ref_lat);
    2.0 * (dx * dx + dy * dy).sqrt()
}

/// Lay out flight lines over `outline`. `None` when there is nothing to fly.
pub fn plan_mission(
    footprint: &DerivedFootprint,
    params: &FlightParameters,
    outline: &[Ring],
    crs: CoordinateSystem,
) -> Option<MissionPlan> {
    let area = outline_extent(outline)?;
    let (width_m, height_m) = area.size_m(crs);
    if width_m <= 0.0 || height_m <= 0.0 {
        return None;
    }

    let flight_lines = ((height_m / footprint.base_by_m).ceil() as u32).max(1);
    let exposures_per_line = (width_m / footprint.base_bx_m).ceil() as u32 + 1;
    let turn_legs = flight_lines.saturating_sub(1) as f64 * footprint.base_by_m;
    let survey_distance_m = flight_lines as f64 * width_m + turn_legs;

    let ferry_distance_m = match (crs, params.airport) {
        (CoordinateSystem::Geographic, Some(airport)) => {
            Some(ferry_distance_m(&airport, area.center()))
        }
        _ => None,
    };
    let total_km = (survey_distance_m + ferry_distance_m.unwrap_or(0.0)) / 1000.0;

    Some(MissionPlan {
        flight_lines,
        exposures_per_line,
        total_exposures: flight_lines * exposures_per_line,
        line_length_m: width_m,
        line_spacing_m: footprint.base_by_m,
        exposure_spacing_m: footprint.base_bx_m,
        survey_distance_m,
        ferry_distance_m,
        flight_time_h: total_km / params.speed_kmh,
    })
}

impl SurveyEngine {
    /// Mission layout over the current merged outline.
    pub fn mission_plan(&mut self) -> Option<MissionPlan> {
        let footprint = self.footprint();
        let outline = self.merged_outline();
        plan_mission(&footprint, self.flight_parameters(), &outline, self.crs())
    }
}
