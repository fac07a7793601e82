//! Unit conversion helpers shared by the calculators.
//!
//! Degree/meter scaling uses the latitude-aware WGS84 series, which is plenty
//! at survey scale (a few tens of kilometres).

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Decimal places kept when values cross the presentation boundary.
pub const PRESENTATION_DECIMALS: u32 = 5;

/// Micrometres to meters.
pub fn micrometers_to_meters(um: f64) -> f64 {
    um / 1_000_000.0
}

/// Millimetres to meters.
pub fn millimeters_to_meters(mm: f64) -> f64 {
    mm / 1_000.0
}

/// Radians to microradians.
pub fn radians_to_microradians(rad: f64) -> f64 {
    rad * 1e6
}

pub fn degrees_to_radians(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn radians_to_degrees(rad: f64) -> f64 {
    rad.to_degrees()
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert degrees latitude to meters using local scaling.
pub fn lat_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lat(ref_lat_deg)
}

/// Convert degrees longitude to meters at a given latitude.
pub fn lon_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lon(ref_lat_deg)
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lat(ref_lat_deg).max(1e-9)
}

/// Convert an east/west offset in meters to degrees longitude.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lon(ref_lat_deg).max(1e-9)
}

/// Round to a fixed number of decimal places.
///
/// Non-finite input is returned unchanged and `-0.0` collapses to `0.0` so
/// rounded values can be compared and formatted without sign noise.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round at the presentation boundary.
pub fn present(value: f64) -> f64 {
    round_to(value, PRESENTATION_DECIMALS)
}
