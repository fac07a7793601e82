//! Terrain cell calculator.

use crate::error::InvalidElevationRange;
use crate::models::{CellElevation, CellTerrain, ReliefType, TerrainResult};
use serde::{Deserialize, Serialize};

/// Elevation-difference ratio at and above which terrain counts as variable.
pub const VARIABLE_RELIEF_THRESHOLD: f64 = 0.2;

/// Terrain values for a cell with the given elevation range, flown at
/// `flight_height_m` above ground.
pub fn compute_terrain(
    min_height: f64,
    max_height: f64,
    flight_height_m: f64,
) -> Result<TerrainResult, InvalidElevationRange> {
    if min_height > max_height {
        return Err(InvalidElevationRange {
            min_height,
            max_height,
        });
    }

    let mean_height = ((max_height + min_height) / 2.0).round();
    let elevation_difference = (max_height - min_height) / flight_height_m;
    let relief = if elevation_difference >= VARIABLE_RELIEF_THRESHOLD {
        ReliefType::Variable
    } else {
        ReliefType::Plain
    };

    Ok(TerrainResult {
        mean_height,
        absolute_height: flight_height_m + mean_height,
        elevation_difference,
        relief,
    })
}

/// Terrain state for an optional elevation input.
pub fn evaluate_cell(elevation: Option<&CellElevation>, flight_height_m: f64) -> CellTerrain {
    match elevation {
        None => CellTerrain::Unset,
        Some(e) => match compute_terrain(e.min_height, e.max_height, flight_height_m) {
            Ok(result) => CellTerrain::Computed(result),
            Err(flag) => CellTerrain::Flagged(flag),
        },
    }
}

/// Aggregate terrain figures across the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainSummary {
    pub plain_cells: usize,
    pub variable_cells: usize,
    pub flagged_cells: usize,
    pub unset_cells: usize,
    pub min_absolute_height: Option<f64>,
    pub max_absolute_height: Option<f64>,
}

impl TerrainSummary {
    pub fn add(&mut self, terrain: &CellTerrain) {
        match terrain {
            CellTerrain::Unset => self.unset_cells += 1,
            CellTerrain::Flagged(_) => self.flagged_cells += 1,
            CellTerrain::Computed(result) => {
                match result.relief {
                    ReliefType::Plain => self.plain_cells += 1,
                    ReliefType::Variable => self.variable_cells += 1,
                }
                let h = result.absolute_height;
                self.min_absolute_height = Some(self.min_absolute_height.map_or(h, |m| m.min(h)));
                self.max_absolute_height = Some(self.max_absolute_height.map_or(h, |m| m.max(h)));
            }
        }
    }
}
