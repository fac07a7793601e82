//! Core data models for the survey engine.

use crate::error::InvalidElevationRange;
use crate::units::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used when deriving a cell identity from its origin corner.
pub const CELL_ID_DECIMALS: u32 = 7;

/// Four distinct vertices of a quadrilateral cell, counter-clockwise.
/// The closing vertex is implicit.
pub type CellRing = [[f64; 2]; 4];

/// Closed vertex sequence (first == last) as handed to renderers and exporters.
pub type Ring = Vec<[f64; 2]>;

/// Camera, lens and flight inputs for one survey layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightParameters {
    /// Sensor width in pixels
    pub sensor_width_px: f64,
    /// Sensor height in pixels (expected <= width)
    pub sensor_height_px: f64,
    /// Pixel pitch in micrometres
    pub pixel_pitch_um: f64,
    /// Focal length in millimetres
    pub focal_length_mm: f64,
    /// Image scale denominator (ground units per sensor unit)
    pub image_scale: f64,
    /// Forward (along-track) overlap, percent in [0, 100)
    pub forward_overlap_pct: f64,
    /// Side (across-track) overlap, percent in [30, 100)
    pub side_overlap_pct: f64,
    /// Aircraft speed in km/h
    pub speed_kmh: f64,
    #[serde(default)]
    pub airport: Option<AirportLocation>,
}

impl Default for FlightParameters {
    fn default() -> Self {
        Self {
            sensor_width_px: 17_000.0,
            sensor_height_px: 17_000.0,
            pixel_pitch_um: 5.0,
            focal_length_mm: 112.0,
            image_scale: 25_000.0,
            forward_overlap_pct: 30.0,
            side_overlap_pct: 60.0,
            speed_kmh: 360.0,
            airport: None,
        }
    }
}

/// Departure airfield, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirportLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Partial edit of [`FlightParameters`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightParametersUpdate {
    #[serde(default)]
    pub sensor_width_px: Option<f64>,
    #[serde(default)]
    pub sensor_height_px: Option<f64>,
    #[serde(default)]
    pub pixel_pitch_um: Option<f64>,
    #[serde(default)]
    pub focal_length_mm: Option<f64>,
    #[serde(default)]
    pub image_scale: Option<f64>,
    #[serde(default)]
    pub forward_overlap_pct: Option<f64>,
    #[serde(default)]
    pub side_overlap_pct: Option<f64>,
    #[serde(default)]
    pub speed_kmh: Option<f64>,
    #[serde(default)]
    pub airport: Option<AirportLocation>,
    /// Remove the stored airport. Ignored when `airport` is given.
    #[serde(default)]
    pub clear_airport: bool,
}

impl FlightParametersUpdate {
    /// Overlay this edit on `base`.
    pub fn apply_to(&self, base: &FlightParameters) -> FlightParameters {
        FlightParameters {
            sensor_width_px: self.sensor_width_px.unwrap_or(base.sensor_width_px),
            sensor_height_px: self.sensor_height_px.unwrap_or(base.sensor_height_px),
            pixel_pitch_um: self.pixel_pitch_um.unwrap_or(base.pixel_pitch_um),
            focal_length_mm: self.focal_length_mm.unwrap_or(base.focal_length_mm),
            image_scale: self.image_scale.unwrap_or(base.image_scale),
            forward_overlap_pct: self.forward_overlap_pct.unwrap_or(base.forward_overlap_pct),
            side_overlap_pct: self.side_overlap_pct.unwrap_or(base.side_overlap_pct),
            speed_kmh: self.speed_kmh.unwrap_or(base.speed_kmh),
            airport: match (self.airport, self.clear_airport) {
                (Some(airport), _) => Some(airport),
                (None, true) => None,
                (None, false) => base.airport,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Footprint, overlap and resolution values derived from [`FlightParameters`].
///
/// Values are kept at full precision; call [`DerivedFootprint::rounded`] only
/// when handing them to a display or export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFootprint {
    /// imageScale × focalLength, in millimetres
    pub flight_height_mm: f64,
    /// Flight height above ground in meters
    pub flight_height_m: f64,
    /// Image extent on the sensor across the short side (lx), meters
    pub image_lx_m: f64,
    /// Image extent on the sensor across the long side (ly), meters
    pub image_ly_m: f64,
    /// Ground swath along track (Lx), meters
    pub swath_lx_m: f64,
    /// Ground swath across track (Ly), meters
    pub swath_ly_m: f64,
    /// Distance between successive exposures (Bx), meters
    pub base_bx_m: f64,
    /// Distance between flight lines (By), meters
    pub base_by_m: f64,
    /// Ground sample interval, meters
    pub gsi_m: f64,
    /// Instantaneous field of view, microradians
    pub ifov_urad: f64,
    /// Ground instantaneous field of view, meters
    pub gifov_m: f64,
    /// Full field of view across the sensor width, microradians
    pub fov_urad: f64,
    /// Ground field of view across the sensor width, meters
    pub gfov_m: f64,
    /// speed / 36
    pub ground_speed: f64,
    /// Sensor height exceeds sensor width (camera probably mounted rotated)
    pub orientation_warning: bool,
}

/// Stable cell identity derived from the cell's origin (minimum) corner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    /// Identity for a cell whose bounding-box minimum corner is `(x, y)`.
    pub fn from_origin(x: f64, y: f64) -> Self {
        let decimals = CELL_ID_DECIMALS as usize;
        Self(format!(
            "{:.*}_{:.*}",
            decimals,
            round_to(x, CELL_ID_DECIMALS),
            decimals,
            round_to(y, CELL_ID_DECIMALS)
        ))
    }

    /// Identity for a ring: its bounding-box minimum corner.
    pub fn from_ring(ring: &CellRing) -> Self {
        let x = ring.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        let y = ring.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
        Self::from_origin(x, y)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CellId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Why a shape could not produce a quadrilateral ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingDefect {
    VertexCount(usize),
    NonFinite,
}

/// Geometry of a selectable cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellShape {
    /// Axis-aligned rectangle given by opposite corners
    Rectangle { min: [f64; 2], max: [f64; 2] },
    /// Arbitrary quadrilateral; a repeated closing vertex is tolerated
    Polygon { vertices: Vec<[f64; 2]> },
}

impl CellShape {
    /// Extract the counter-clockwise quadrilateral ring of this shape.
    pub fn ring(&self) -> Result<CellRing, RingDefect> {
        match self {
            CellShape::Rectangle { min, max } => rectangle_ring(*min, *max),
            CellShape::Polygon { vertices } => polygon_ring(vertices),
        }
    }

    /// Identity derived from this shape's origin corner.
    pub fn cell_id(&self) -> Result<CellId, RingDefect> {
        self.ring().map(|ring| CellId::from_ring(&ring))
    }
}

fn rectangle_ring(a: [f64; 2], b: [f64; 2]) -> Result<CellRing, RingDefect> {
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(RingDefect::NonFinite);
    }
    let (x0, x1) = (a[0].min(b[0]), a[0].max(b[0]));
    let (y0, y1) = (a[1].min(b[1]), a[1].max(b[1]));
    Ok([[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
}

fn polygon_ring(vertices: &[[f64; 2]]) -> Result<CellRing, RingDefect> {
    let open = match vertices {
        [first, .., last] if vertices.len() == 5 && first == last => &vertices[..4],
        _ => vertices,
    };
    if open.len() != 4 {
        return Err(RingDefect::VertexCount(vertices.len()));
    }
    if open.iter().flatten().any(|v| !v.is_finite()) {
        return Err(RingDefect::NonFinite);
    }
    let mut ring = [open[0], open[1], open[2], open[3]];
    if crate::geometry::signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    Ok(ring)
}

/// User-entered elevation range of a cell, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellElevation {
    pub min_height: f64,
    pub max_height: f64,
}

/// A selected cell's authoritative inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: CellId,
    pub shape: CellShape,
    pub ring: CellRing,
    pub elevation: Option<CellElevation>,
}

impl GridCell {
    /// Ring with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Ring {
        crate::geometry::close_ring(&self.ring)
    }
}

/// Coarse terrain-variability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliefType {
    Plain,
    Variable,
}

impl fmt::Display for ReliefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReliefType::Plain => f.write_str("Plain"),
            ReliefType::Variable => f.write_str("Variable"),
        }
    }
}

/// Terrain values derived for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainResult {
    pub mean_height: f64,
    pub absolute_height: f64,
    pub elevation_difference: f64,
    pub relief: ReliefType,
}

/// Terrain state of a selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CellTerrain {
    /// No elevation entered yet
    Unset,
    Computed(TerrainResult),
    /// min > max; excluded from aggregation until corrected
    Flagged(InvalidElevationRange),
}

impl CellTerrain {
    pub fn is_flagged(&self) -> bool {
        matches!(self, CellTerrain::Flagged(_))
    }

    pub fn result(&self) -> Option<&TerrainResult> {
        match self {
            CellTerrain::Computed(result) => Some(result),
            _ => None,
        }
    }
}

/// How cell coordinates are interpreted when measuring area and distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// x = longitude, y = latitude, decimal degrees
    #[default]
    Geographic,
    /// x = easting, y = northing, meters
    Projected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_ring_is_counter_clockwise_from_origin() {
        let shape = CellShape::Rectangle {
            min: [2.0, 1.0],
            max: [0.0, 3.0],
        };
        let ring = shape.ring().unwrap();
        assert_eq!(ring, [[0.0, 1.0], [2.0, 1.0], [2.0, 3.0], [0.0, 3.0]]);
        assert_eq!(shape.cell_id().unwrap(), CellId::from_origin(0.0, 1.0));
    }

    #[test]
    fn polygon_ring_accepts_closed_input_and_fixes_winding() {
        let shape = CellShape::Polygon {
            vertices: vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        };
        let ring = shape.ring().unwrap();
        assert!(crate::geometry::signed_area(&ring) > 0.0);
    }

    #[test]
    fn polygon_with_wrong_vertex_count_is_rejected() {
        let shape = CellShape::Polygon {
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        };
        assert_eq!(shape.ring(), Err(RingDefect::VertexCount(3)));
    }

    #[test]
    fn cell_id_is_stable_under_float_noise() {
        let a = CellId::from_origin(10.123_456_78, -0.000_000_01);
        let b = CellId::from_origin(10.123_456_780_000_1, 0.0);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "10.1234568_0.0000000");
    }

    #[test]
    fn update_overlays_only_given_fields() {
        let base = FlightParameters::default();
        let update = FlightParametersUpdate {
            focal_length_mm: Some(150.0),
            ..Default::default()
        };
        let merged = update.apply_to(&base);
        assert_eq!(merged.focal_length_mm, 150.0);
        assert_eq!(merged.image_scale, base.image_scale);
        assert!(FlightParametersUpdate::default().is_empty());
    }

    #[test]
    fn update_can_clear_the_airport() {
        let base = FlightParameters {
            airport: Some(AirportLocation { lat: 45.0, lon: 20.0 }),
            ..FlightParameters::default()
        };
        let keep = FlightParametersUpdate {
            speed_kmh: Some(150.0),
            ..Default::default()
        };
        assert_eq!(keep.apply_to(&base).airport, base.airport);

        let clear = FlightParametersUpdate {
            clear_airport: true,
            ..Default::default()
        };
        assert!(!clear.is_empty());
        assert_eq!(clear.apply_to(&base).airport, None);
    }
}
