//! Serialization adapter: survey state to and from its persisted record.
//!
//! Only authoritative inputs are stored (flight parameters, selected cells
//! with their rings and elevation inputs, grid, style). Derived values are
//! rebuilt on load by running the same calculators again, so a round trip
//! reproduces them exactly.

use crate::engine::SurveyEngine;
use crate::error::{MalformedCellError, PersistError};
use crate::grid::SurveyGrid;
use crate::models::{CellElevation, CellId, CellShape, CoordinateSystem, FlightParameters};
use crate::style::StyleSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Polygon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: String,
    pub kind: ShapeKind,
    /// Four vertices, closing vertex implicit
    pub ring: Vec<[f64; 2]>,
    #[serde(default)]
    pub elevation: Option<CellElevation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub crs: CoordinateSystem,
    pub flight: FlightParameters,
    #[serde(default)]
    pub grid: Option<SurveyGrid>,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
    #[serde(default)]
    pub style: StyleSettings,
}

/// Everything a survey layer persists: the engine plus the collaborators'
/// grid and style.
#[derive(Debug, Clone, Default)]
pub struct SurveyProject {
    pub engine: SurveyEngine,
    pub grid: Option<SurveyGrid>,
    pub style: StyleSettings,
}

/// Result of a load: the project plus every cell that had to be dropped.
#[derive(Debug)]
pub struct LoadReport {
    pub project: SurveyProject,
    pub rejected: Vec<MalformedCellError>,
}

pub fn serialize(project: &SurveyProject) -> SurveyRecord {
    let engine = &project.engine;
    let cells = engine
        .cells()
        .map(|cell| CellRecord {
            id: cell.id.to_string(),
            kind: match cell.shape {
                CellShape::Rectangle { .. } => ShapeKind::Rectangle,
                CellShape::Polygon { .. } => ShapeKind::Polygon,
            },
            ring: cell.ring.to_vec(),
            elevation: cell.elevation,
        })
        .collect();

    SurveyRecord {
        version: RECORD_VERSION,
        saved_at: Utc::now(),
        crs: engine.crs(),
        flight: engine.flight_parameters().clone(),
        grid: project.grid.clone(),
        cells,
        style: project.style.clone(),
    }
}

fn restore_shape(record: &CellRecord) -> Result<CellShape, MalformedCellError> {
    if record.ring.len() != 4 {
        return Err(MalformedCellError::VertexCount {
            id: record.id.clone(),
            count: record.ring.len(),
        });
    }
    if record.ring.iter().flatten().any(|v| !v.is_finite()) {
        return Err(MalformedCellError::NonFiniteVertex {
            id: record.id.clone(),
        });
    }
    Ok(match record.kind {
        ShapeKind::Rectangle => {
            let xs = record.ring.iter().map(|p| p[0]);
            let ys = record.ring.iter().map(|p| p[1]);
            CellShape::Rectangle {
                min: [
                    xs.clone().fold(f64::INFINITY, f64::min),
                    ys.clone().fold(f64::INFINITY, f64::min),
                ],
                max: [
                    xs.fold(f64::NEG_INFINITY, f64::max),
                    ys.fold(f64::NEG_INFINITY, f64::max),
                ],
            }
        }
        ShapeKind::Polygon => CellShape::Polygon {
            vertices: record.ring.clone(),
        },
    })
}

fn restore_cell(
    engine: &mut SurveyEngine,
    record: &CellRecord,
) -> Result<CellId, MalformedCellError> {
    let shape = restore_shape(record)?;
    let expected = shape
        .cell_id()
        .map_err(|_| MalformedCellError::NonFiniteVertex {
            id: record.id.clone(),
        })?;
    if expected.as_str() != record.id {
        return Err(MalformedCellError::IdentityMismatch {
            id: record.id.clone(),
            expected,
        });
    }
    if let Some(e) = record.elevation {
        if !e.min_height.is_finite() || !e.max_height.is_finite() {
            return Err(MalformedCellError::NonFiniteElevation {
                id: record.id.clone(),
            });
        }
    }

    let rejected = |err: crate::error::EngineError| MalformedCellError::Rejected {
        id: record.id.clone(),
        reason: err.to_string(),
    };
    let inserted = engine.select_cell(expected.clone(), shape).map_err(rejected)?;
    if !inserted {
        return Err(MalformedCellError::Duplicate {
            id: record.id.clone(),
        });
    }
    if let Some(e) = record.elevation {
        engine
            .set_cell_elevation(&expected, e.min_height, e.max_height)
            .map_err(rejected)?;
    }
    Ok(expected)
}

/// Rebuild a project from its record and run a full recompute before
/// returning. Malformed cells are dropped one by one; invalid flight
/// parameters or an unknown record version fail the whole load.
pub fn deserialize(record: SurveyRecord) -> Result<LoadReport, PersistError> {
    if record.version != RECORD_VERSION {
        return Err(PersistError::UnsupportedVersion(record.version));
    }

    let mut engine = SurveyEngine::new(record.flight, record.crs)?;
    let mut rejected = Vec::new();
    for cell in &record.cells {
        if let Err(err) = restore_cell(&mut engine, cell) {
            tracing::warn!(error = %err, "dropping malformed cell");
            rejected.push(err);
        }
    }
    engine.recompute_all();
    tracing::info!(
        cells = engine.len(),
        rejected = rejected.len(),
        "survey record loaded"
    );

    Ok(LoadReport {
        project: SurveyProject {
            engine,
            grid: record.grid,
            style: record.style,
        },
        rejected,
    })
}
