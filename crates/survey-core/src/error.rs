//! Error taxonomy for the survey engine.
//!
//! Every error is reported at the call that caused it. None of them is fatal:
//! parameter errors leave the previous state in place, elevation errors flag a
//! single cell, dissolve errors only blank the merged outline, and malformed
//! cells are dropped individually while loading.

use crate::models::CellId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed flight input. The edit is rejected and the prior parameters kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameterError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be within [{min}, {max}), got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("airport location ({lat}, {lon}) is not a valid latitude/longitude")]
    AirportLocation { lat: f64, lon: f64 },
}

/// Per-cell flag raised when the minimum elevation exceeds the maximum.
///
/// This is a state, not a hard failure: the cell stays selected and editable
/// but is skipped by area and outline aggregation until corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Error)]
#[error("minimum elevation {min_height} exceeds maximum elevation {max_height}")]
pub struct InvalidElevationRange {
    pub min_height: f64,
    pub max_height: f64,
}

/// The boundary edges left after cancellation could not be traced into
/// simple outer rings. Rendering falls back to no merged outline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DissolveError {
    #[error("boundary is open at ({x}, {y}): no outgoing edge")]
    OpenBoundary { x: f64, y: f64 },
    #[error("edge ({x1}, {y1}) -> ({x2}, {y2}) is shared by overlapping cells")]
    NonManifoldEdge { x1: f64, y1: f64, x2: f64, y2: f64 },
    #[error("cell {0} is degenerate (zero area)")]
    DegenerateCell(CellId),
    #[error("cells {0} and {1} overlap")]
    Overlap(CellId, CellId),
    #[error("selection encloses an unselected hole ({0} hole ring(s))")]
    HoledCluster(usize),
}

/// A persisted cell that could not be rebuilt. Only that cell is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedCellError {
    #[error("cell {id}: ring has {count} vertices, expected 4")]
    VertexCount { id: String, count: usize },
    #[error("cell {id}: ring contains a non-finite coordinate")]
    NonFiniteVertex { id: String },
    #[error("cell {id}: stored identity does not match ring origin {expected}")]
    IdentityMismatch { id: String, expected: CellId },
    #[error("cell {id}: identity appears more than once")]
    Duplicate { id: String },
    #[error("cell {id}: elevation input is not finite")]
    NonFiniteElevation { id: String },
    #[error("cell {id}: rejected by the engine: {reason}")]
    Rejected { id: String, reason: String },
}

/// Errors from engine edit operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
    #[error(transparent)]
    MalformedCell(#[from] MalformedCellError),
    #[error("cell {0} is not selected")]
    UnknownCell(CellId),
    #[error("identity {given} does not match shape origin {expected}")]
    IdentityMismatch { given: CellId, expected: CellId },
    #[error("cell {0} is already selected with a different shape")]
    ShapeConflict(CellId),
    #[error("elevation input for cell {0} is not finite")]
    NonFiniteElevation(CellId),
}

/// Errors from restoring a persisted survey record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistError {
    #[error("unsupported survey record version {0}")]
    UnsupportedVersion(u32),
    #[error("stored flight parameters are invalid: {0}")]
    FlightParameters(#[from] InvalidParameterError),
}
