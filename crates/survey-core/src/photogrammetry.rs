//! Photogrammetric calculator: camera, lens and flight inputs to footprint,
//! overlap and angular-resolution metrics.
//!
//! All formulas are closed form. Results carry full precision; rounding is
//! only applied by [`DerivedFootprint::rounded`] at the presentation boundary.

use crate::error::InvalidParameterError;
use crate::models::{AirportLocation, DerivedFootprint, FlightParameters};
use crate::units::{micrometers_to_meters, millimeters_to_meters, present, radians_to_microradians};

/// Divisor turning the entered aircraft speed into ground distance per time unit.
pub const GROUND_SPEED_DIVISOR: f64 = 36.0;

const FORWARD_OVERLAP_RANGE: (f64, f64) = (0.0, 100.0);
const SIDE_OVERLAP_RANGE: (f64, f64) = (30.0, 100.0);

/// Check every field of `params`.
pub fn validate(params: &FlightParameters) -> Result<(), InvalidParameterError> {
    positive("sensor_width_px", params.sensor_width_px)?;
    positive("sensor_height_px", params.sensor_height_px)?;
    positive("pixel_pitch_um", params.pixel_pitch_um)?;
    positive("focal_length_mm", params.focal_length_mm)?;
    positive("image_scale", params.image_scale)?;
    positive("speed_kmh", params.speed_kmh)?;
    bounded(
        "forward_overlap_pct",
        params.forward_overlap_pct,
        FORWARD_OVERLAP_RANGE,
    )?;
    bounded("side_overlap_pct", params.side_overlap_pct, SIDE_OVERLAP_RANGE)?;
    if let Some(airport) = params.airport {
        validate_airport(&airport)?;
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), InvalidParameterError> {
    if !value.is_finite() {
        return Err(InvalidParameterError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(InvalidParameterError::NonPositive { field, value });
    }
    Ok(())
}

fn bounded(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), InvalidParameterError> {
    if !value.is_finite() {
        return Err(InvalidParameterError::NonFinite { field, value });
    }
    if value < min || value >= max {
        return Err(InvalidParameterError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn validate_airport(airport: &AirportLocation) -> Result<(), InvalidParameterError> {
    let lat_ok = airport.lat.is_finite() && (-90.0..=90.0).contains(&airport.lat);
    let lon_ok = airport.lon.is_finite() && (-180.0..=180.0).contains(&airport.lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(InvalidParameterError::AirportLocation {
            lat: airport.lat,
            lon: airport.lon,
        })
    }
}

/// Derive the footprint for `params`, validating first.
pub fn compute_footprint(
    params: &FlightParameters,
) -> Result<DerivedFootprint, InvalidParameterError> {
    validate(params)?;
    Ok(derive_footprint(params))
}

/// Footprint for parameters that already passed [`validate`].
pub(crate) fn derive_footprint(params: &FlightParameters) -> DerivedFootprint {
    let pixel_size_m = micrometers_to_meters(params.pixel_pitch_um);
    let focal_length_m = millimeters_to_meters(params.focal_length_mm);
    let scale = params.image_scale;

    let flight_height_mm = scale * params.focal_length_mm;

    let image_ly_m = params.sensor_width_px * pixel_size_m;
    let swath_ly_m = image_ly_m * scale;
    let base_by_m = swath_ly_m * (100.0 - params.side_overlap_pct) / 100.0;

    let image_lx_m = params.sensor_height_px * pixel_size_m;
    let swath_lx_m = image_lx_m * scale;
    let base_bx_m = swath_lx_m * (100.0 - params.forward_overlap_pct) / 100.0;

    let gsi_m = pixel_size_m * scale;
    let ifov_urad = radians_to_microradians(pixel_size_m / focal_length_m);

    let orientation_warning = params.sensor_height_px > params.sensor_width_px;
    if orientation_warning {
        tracing::warn!(
            sensor_width_px = params.sensor_width_px,
            sensor_height_px = params.sensor_height_px,
            "sensor height exceeds width; check camera orientation"
        );
    }

    DerivedFootprint {
        flight_height_mm,
        flight_height_m: millimeters_to_meters(flight_height_mm),
        image_lx_m,
        image_ly_m,
        swath_lx_m,
        swath_ly_m,
        base_bx_m,
        base_by_m,
        gsi_m,
        ifov_urad,
        gifov_m: gsi_m,
        fov_urad: params.sensor_width_px * ifov_urad,
        gfov_m: params.sensor_width_px * gsi_m,
        ground_speed: params.speed_kmh / GROUND_SPEED_DIVISOR,
        orientation_warning,
    }
}

impl DerivedFootprint {
    /// Copy with every metric rounded for display or export.
    pub fn rounded(&self) -> DerivedFootprint {
        DerivedFootprint {
            flight_height_mm: present(self.flight_height_mm),
            flight_height_m: present(self.flight_height_m),
            image_lx_m: present(self.image_lx_m),
            image_ly_m: present(self.image_ly_m),
            swath_lx_m: present(self.swath_lx_m),
            swath_ly_m: present(self.swath_ly_m),
            base_bx_m: present(self.base_bx_m),
            base_by_m: present(self.base_by_m),
            gsi_m: present(self.gsi_m),
            ifov_urad: present(self.ifov_urad),
            gifov_m: present(self.gifov_m),
            fov_urad: present(self.fov_urad),
            gfov_m: present(self.gfov_m),
            ground_speed: present(self.ground_speed),
            orientation_warning: self.orientation_warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn golden_scenario() {
        let params = FlightParameters::default();
        let fp = compute_footprint(&params).unwrap();

        assert!(close(fp.flight_height_mm, 2_800_000.0, 1e-6));
        assert!(close(fp.flight_height_m, 2_800.0, 1e-9));
        assert!(close(fp.gsi_m, 0.125, 1e-12));
        assert!(close(fp.gifov_m, 0.125, 1e-12));
        assert!(close(fp.image_ly_m, 0.085, 1e-12));
        assert!(close(fp.swath_ly_m, 2_125.0, 1e-8));
        assert!(close(fp.base_by_m, 850.0, 1e-8));
        assert!(close(fp.swath_lx_m, 2_125.0, 1e-8));
        assert!(close(fp.base_bx_m, 1_487.5, 1e-8));
        assert!(close(fp.ifov_urad, 44.642_857_142_857, 1e-9));
        assert!(close(fp.fov_urad, 758_928.571_428_57, 1e-5));
        assert!(close(fp.gfov_m, 2_125.0, 1e-8));
        assert!(close(fp.ground_speed, 10.0, 1e-12));
        assert!(!fp.orientation_warning);

        let shown = fp.rounded();
        assert_eq!(shown.ifov_urad, 44.64286);
        assert_eq!(shown.fov_urad, 758_928.57143);
        assert_eq!(shown.gsi_m, 0.125);
    }

    #[test]
    fn swath_to_base_ratio_matches_overlap() {
        for (fwd, side) in [(0.0, 30.0), (30.0, 60.0), (60.0, 30.0), (80.0, 95.5)] {
            let params = FlightParameters {
                forward_overlap_pct: fwd,
                side_overlap_pct: side,
                ..FlightParameters::default()
            };
            let fp = compute_footprint(&params).unwrap();
            assert!(close(fp.swath_ly_m / fp.base_by_m, 100.0 / (100.0 - side), 1e-9));
            assert!(close(fp.swath_lx_m / fp.base_bx_m, 100.0 / (100.0 - fwd), 1e-9));
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let base = FlightParameters::default();

        let zero_focal = FlightParameters {
            focal_length_mm: 0.0,
            ..base.clone()
        };
        assert!(matches!(
            compute_footprint(&zero_focal),
            Err(InvalidParameterError::NonPositive {
                field: "focal_length_mm",
                ..
            })
        ));

        let nan_scale = FlightParameters {
            image_scale: f64::NAN,
            ..base.clone()
        };
        assert!(matches!(
            compute_footprint(&nan_scale),
            Err(InvalidParameterError::NonFinite { .. })
        ));

        let full_forward = FlightParameters {
            forward_overlap_pct: 100.0,
            ..base.clone()
        };
        assert!(matches!(
            compute_footprint(&full_forward),
            Err(InvalidParameterError::OutOfRange { .. })
        ));

        let thin_side = FlightParameters {
            side_overlap_pct: 29.9,
            ..base.clone()
        };
        assert!(compute_footprint(&thin_side).is_err());

        let bad_airport = FlightParameters {
            airport: Some(AirportLocation {
                lat: 91.0,
                lon: 0.0,
            }),
            ..base
        };
        assert!(matches!(
            compute_footprint(&bad_airport),
            Err(InvalidParameterError::AirportLocation { .. })
        ));
    }

    #[test]
    fn portrait_sensor_sets_advisory_only() {
        let params = FlightParameters {
            sensor_width_px: 10_000.0,
            sensor_height_px: 14_000.0,
            ..FlightParameters::default()
        };
        let fp = compute_footprint(&params).unwrap();
        assert!(fp.orientation_warning);
    }

    #[test]
    fn same_input_gives_bit_identical_output() {
        let params = FlightParameters::default();
        let a = compute_footprint(&params).unwrap();
        let b = compute_footprint(&params).unwrap();
        assert_eq!(a.flight_height_m.to_bits(), b.flight_height_m.to_bits());
        assert_eq!(a.fov_urad.to_bits(), b.fov_urad.to_bits());
        assert_eq!(a, b);
    }
}
