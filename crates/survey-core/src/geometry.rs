//! Planar ring helpers: area, extent, containment.

use crate::models::{CoordinateSystem, Ring};
use crate::units::{lat_to_meters, lon_to_meters};
use serde::{Deserialize, Serialize};

/// Axis-aligned extent of a vertex set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ]
    }

    /// Grow to include `other`.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Width and height in meters.
    pub fn size_m(&self, crs: CoordinateSystem) -> (f64, f64) {
        match crs {
            CoordinateSystem::Projected => (self.width(), self.height()),
            CoordinateSystem::Geographic => {
                let ref_lat = self.center()[1];
                (
                    lon_to_meters(self.width(), ref_lat),
                    lat_to_meters(self.height(), ref_lat),
                )
            }
        }
    }
}

/// Shoelace area; positive for counter-clockwise rings. Accepts open or
/// closed vertex sequences.
pub fn signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        twice += a[0] * b[1] - b[0] * a[1];
    }
    twice / 2.0
}

/// Copy `ring` and repeat its first vertex at the end.
pub fn close_ring(ring: &[[f64; 2]]) -> Ring {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            closed.push(*first);
        }
    }
    closed
}

pub fn extent(points: &[[f64; 2]]) -> Option<Extent> {
    let first = points.first()?;
    let mut out = Extent {
        min_x: first[0],
        min_y: first[1],
        max_x: first[0],
        max_y: first[1],
    };
    for p in &points[1..] {
        out.min_x = out.min_x.min(p[0]);
        out.min_y = out.min_y.min(p[1]);
        out.max_x = out.max_x.max(p[0]);
        out.max_y = out.max_y.max(p[1]);
    }
    Some(out)
}

/// Ring area in square meters.
///
/// Geographic rings are projected onto a local plane at their mean latitude
/// before applying the shoelace formula.
pub fn area_m2(ring: &[[f64; 2]], crs: CoordinateSystem) -> f64 {
    match crs {
        CoordinateSystem::Projected => signed_area(ring).abs(),
        CoordinateSystem::Geographic => {
            let Some(ext) = extent(ring) else {
                return 0.0;
            };
            let [ref_lon, ref_lat] = ext.center();
            let local: Vec<[f64; 2]> = ring
                .iter()
                .map(|p| {
                    [
                        lon_to_meters(p[0] - ref_lon, ref_lat),
                        lat_to_meters(p[1] - ref_lat, ref_lat),
                    ]
                })
                .collect();
            signed_area(&local).abs()
        }
    }
}

/// Sum of edge lengths in coordinate units. Closing edge included.
pub fn perimeter(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
        })
        .sum()
}

/// Ray-casting point-in-polygon test. `polygon` may be open or closed.
pub fn contains_point(polygon: &[[f64; 2]], x: f64, y: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i][0], polygon[i][1]);
        let (xj, yj) = (polygon[j][0], polygon[j][1]);

        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];

    #[test]
    fn shoelace_sign_follows_winding() {
        assert_eq!(signed_area(&SQUARE), 4.0);
        let mut cw = SQUARE;
        cw.reverse();
        assert_eq!(signed_area(&cw), -4.0);
        assert_eq!(signed_area(&close_ring(&SQUARE)), 4.0);
    }

    #[test]
    fn close_ring_does_not_duplicate_closed_input() {
        let closed = close_ring(&SQUARE);
        assert_eq!(closed.len(), 5);
        assert_eq!(close_ring(&closed).len(), 5);
    }

    #[test]
    fn geographic_area_uses_local_scale() {
        let cell = [[0.0, 0.0], [0.01, 0.0], [0.01, 0.01], [0.0, 0.01]];
        let area = area_m2(&cell, CoordinateSystem::Geographic);
        // ~1.113 km x 1.106 km at the equator
        assert!((area - 1_231_000.0).abs() < 5_000.0, "area was {area}");
        assert_eq!(area_m2(&SQUARE, CoordinateSystem::Projected), 4.0);
    }

    #[test]
    fn ray_casting_containment() {
        assert!(contains_point(&SQUARE, 1.0, 1.0));
        assert!(!contains_point(&SQUARE, 3.0, 1.0));
        assert!(!contains_point(&SQUARE[..2], 1.0, 1.0));
    }

    #[test]
    fn extent_and_perimeter() {
        let ext = extent(&SQUARE).unwrap();
        assert_eq!(ext.center(), [1.0, 1.0]);
        assert_eq!(perimeter(&SQUARE), 8.0);
        assert!(extent(&[]).is_none());
    }
}
