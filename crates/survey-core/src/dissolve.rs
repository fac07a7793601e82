//! Boundary dissolve: merge selected grid cells into their union's outline.
//!
//! Every cell contributes its four edges counter-clockwise. An edge shared by
//! two selected cells shows up once in each direction and cancels; what is
//! left is the boundary, which is then traced into closed rings. Vertices are
//! compared on an integer lattice (1e-9 coordinate units) so cells from the
//! same grid match exactly.
//!
//! Cells must not overlap. Overlaps that do not repeat an edge are found with
//! a separating-axis test on each cell's triangles before tracing.

use crate::error::DissolveError;
use crate::geometry::signed_area;
use crate::models::{CellId, CellRing, Ring};
use std::collections::BTreeMap;

const KEY_SCALE: f64 = 1e9;

type VertexKey = (i64, i64);
type EdgeKey = (VertexKey, VertexKey);

fn vertex_key(p: [f64; 2]) -> VertexKey {
    (
        (p[0] * KEY_SCALE).round() as i64,
        (p[1] * KEY_SCALE).round() as i64,
    )
}

/// Directed boundary edges keyed by (start, end). Ordered so tracing is
/// deterministic regardless of selection order.
#[derive(Debug, Default)]
struct BoundaryEdges {
    edges: BTreeMap<EdgeKey, ([f64; 2], [f64; 2])>,
}

impl BoundaryEdges {
    /// Add a cell's edges and return its counter-clockwise lattice ring.
    fn add_cell(&mut self, id: &CellId, ring: &CellRing) -> Result<[VertexKey; 4], DissolveError> {
        let mut ring = *ring;
        let area = signed_area(&ring);
        if area == 0.0 || !area.is_finite() {
            return Err(DissolveError::DegenerateCell(id.clone()));
        }
        if area < 0.0 {
            ring.reverse();
        }

        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            let (ka, kb) = (vertex_key(a), vertex_key(b));
            if ka == kb {
                continue;
            }
            if self.edges.remove(&(kb, ka)).is_some() {
                continue;
            }
            if self.edges.insert((ka, kb), (a, b)).is_some() {
                return Err(DissolveError::NonManifoldEdge {
                    x1: a[0],
                    y1: a[1],
                    x2: b[0],
                    y2: b[1],
                });
            }
        }
        Ok(ring.map(vertex_key))
    }

    fn first(&self) -> Option<EdgeKey> {
        self.edges.keys().next().copied()
    }

    fn take(&mut self, key: &EdgeKey) -> Option<([f64; 2], [f64; 2])> {
        self.edges.remove(key)
    }

    /// Remaining edges leaving `from`.
    fn outgoing(&self, from: VertexKey) -> Vec<EdgeKey> {
        let lo = (from, (i64::MIN, i64::MIN));
        let hi = (from, (i64::MAX, i64::MAX));
        self.edges.range(lo..=hi).map(|(k, _)| *k).collect()
    }
}

/// Pick the sharpest left turn out of `at`, arriving along `incoming`.
///
/// For counter-clockwise outer boundaries this keeps two clusters that only
/// touch at a corner as two separate rings.
fn leftmost_turn(incoming: EdgeKey, candidates: &[EdgeKey]) -> Option<EdgeKey> {
    let (from, at) = incoming;
    let din = ((at.0 - from.0) as f64, (at.1 - from.1) as f64);
    candidates.iter().copied().max_by(|x, y| {
        turn_angle(din, at, x.1).total_cmp(&turn_angle(din, at, y.1))
    })
}

fn turn_angle(din: (f64, f64), at: VertexKey, to: VertexKey) -> f64 {
    let dout = ((to.0 - at.0) as f64, (to.1 - at.1) as f64);
    let cross = din.0 * dout.1 - din.1 * dout.0;
    let dot = din.0 * dout.0 + din.1 * dout.1;
    cross.atan2(dot)
}

fn collinear(a: VertexKey, b: VertexKey, c: VertexKey) -> bool {
    let abx = (b.0 - a.0) as i128;
    let aby = (b.1 - a.1) as i128;
    let bcx = (c.0 - b.0) as i128;
    let bcy = (c.1 - b.1) as i128;
    abx * bcy - aby * bcx == 0 && abx * bcx + aby * bcy > 0
}

/// Drop vertices lying on a straight run, including across the ring seam.
fn simplify(points: Vec<(VertexKey, [f64; 2])>) -> Vec<(VertexKey, [f64; 2])> {
    let mut out: Vec<(VertexKey, [f64; 2])> = Vec::with_capacity(points.len());
    for p in points {
        out.push(p);
        while out.len() >= 3 {
            let n = out.len();
            if collinear(out[n - 3].0, out[n - 2].0, out[n - 1].0) {
                out.remove(n - 2);
            } else {
                break;
            }
        }
    }
    while out.len() >= 3 {
        let n = out.len();
        if collinear(out[n - 2].0, out[n - 1].0, out[0].0) {
            out.pop();
        } else if collinear(out[n - 1].0, out[0].0, out[1].0) {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

/// Split a traced walk wherever it revisits a vertex, so every returned loop
/// is simple. A pinched walk can carry a hole and an outer ring at once.
fn split_loops(points: Vec<(VertexKey, [f64; 2])>) -> Vec<Vec<(VertexKey, [f64; 2])>> {
    let mut loops = Vec::new();
    let mut stack: Vec<(VertexKey, [f64; 2])> = Vec::with_capacity(points.len());
    for point in points {
        if let Some(i) = stack.iter().position(|(key, _)| *key == point.0) {
            loops.push(stack.split_off(i));
        }
        stack.push(point);
    }
    loops.push(stack);
    loops
}

fn trace_rings(mut boundary: BoundaryEdges) -> Result<Vec<Ring>, DissolveError> {
    let mut outer = Vec::new();
    let mut holes = 0usize;

    while let Some(start_key) = boundary.first() {
        let Some((start, end)) = boundary.take(&start_key) else {
            break;
        };
        let ring_start = start_key.0;
        let mut points = vec![(ring_start, start)];
        let mut current = start_key;
        let mut current_end = end;

        while current.1 != ring_start {
            let candidates = boundary.outgoing(current.1);
            let next = if candidates.len() > 1 {
                leftmost_turn(current, &candidates)
            } else {
                candidates.first().copied()
            };
            let Some((next, (a, b))) = next.and_then(|k| boundary.take(&k).map(|e| (k, e)))
            else {
                return Err(DissolveError::OpenBoundary {
                    x: current_end[0],
                    y: current_end[1],
                });
            };
            points.push((next.0, a));
            current = next;
            current_end = b;
        }

        for simple in split_loops(points) {
            let coords: Vec<[f64; 2]> = simplify(simple).iter().map(|(_, p)| *p).collect();
            let area = signed_area(&coords);
            if area < 0.0 {
                holes += 1;
            } else if area > 0.0 {
                outer.push(crate::geometry::close_ring(&coords));
            }
        }
    }

    if holes > 0 {
        return Err(DissolveError::HoledCluster(holes));
    }
    Ok(outer)
}

/// Lattice bounds and triangles of one cell.
struct CellCover<'a> {
    id: &'a CellId,
    min: VertexKey,
    max: VertexKey,
    triangles: Vec<[VertexKey; 3]>,
}

impl<'a> CellCover<'a> {
    fn new(id: &'a CellId, ring: [VertexKey; 4]) -> Self {
        let mut min = ring[0];
        let mut max = ring[0];
        for key in &ring[1..] {
            min = (min.0.min(key.0), min.1.min(key.1));
            max = (max.0.max(key.0), max.1.max(key.1));
        }
        let triangles = triangulate(ring)
            .into_iter()
            .filter(|t| cross(t[0], t[1], t[2]) != 0)
            .collect();
        Self {
            id,
            min,
            max,
            triangles,
        }
    }

    fn overlaps(&self, other: &CellCover<'_>) -> bool {
        self.triangles.iter().any(|a| {
            other
                .triangles
                .iter()
                .any(|b| !separated(a, b) && !separated(b, a))
        })
    }
}

fn cross(o: VertexKey, a: VertexKey, b: VertexKey) -> i128 {
    let (ax, ay) = (a.0 as i128 - o.0 as i128, a.1 as i128 - o.1 as i128);
    let (bx, by) = (b.0 as i128 - o.0 as i128, b.1 as i128 - o.1 as i128);
    ax * by - ay * bx
}

/// Split a counter-clockwise quadrilateral along the diagonal that stays
/// inside it.
fn triangulate(r: [VertexKey; 4]) -> [[VertexKey; 3]; 2] {
    let reflex = |i: usize| cross(r[(i + 3) % 4], r[i], r[(i + 1) % 4]) < 0;
    if reflex(1) || reflex(3) {
        [[r[0], r[1], r[3]], [r[1], r[2], r[3]]]
    } else {
        [[r[0], r[1], r[2]], [r[0], r[2], r[3]]]
    }
}

/// True when one of `a`'s edge normals separates the two triangles. Touching
/// along an edge or at a vertex counts as separated.
fn separated(a: &[VertexKey; 3], b: &[VertexKey; 3]) -> bool {
    (0..3).any(|i| {
        let (p, q) = (a[i], a[(i + 1) % 3]);
        let axis = (q.1 as i128 - p.1 as i128, p.0 as i128 - q.0 as i128);
        let project = |t: &[VertexKey; 3]| {
            let v = t.map(|k| axis.0 * k.0 as i128 + axis.1 * k.1 as i128);
            (v[0].min(v[1]).min(v[2]), v[0].max(v[1]).max(v[2]))
        };
        let (a_lo, a_hi) = project(a);
        let (b_lo, b_hi) = project(b);
        a_hi <= b_lo || b_hi <= a_lo
    })
}

/// Reject any two cells whose interiors intersect. Sweeps on x so only cells
/// with overlapping bounds are compared.
fn check_overlaps(covers: &mut [CellCover<'_>]) -> Result<(), DissolveError> {
    covers.sort_by_key(|c| c.min.0);
    for (i, a) in covers.iter().enumerate() {
        for b in &covers[i + 1..] {
            if b.min.0 >= a.max.0 {
                break;
            }
            if b.min.1 >= a.max.1 || a.min.1 >= b.max.1 {
                continue;
            }
            if a.overlaps(b) {
                return Err(DissolveError::Overlap(a.id.clone(), b.id.clone()));
            }
        }
    }
    Ok(())
}

/// Dissolve the given cells into their outer boundary rings.
///
/// Rings are closed (first vertex repeated) and counter-clockwise, with
/// collinear vertices removed. No cells yields no rings.
pub fn dissolve<'a, I>(cells: I) -> Result<Vec<Ring>, DissolveError>
where
    I: IntoIterator<Item = (&'a CellId, &'a CellRing)>,
{
    let mut boundary = BoundaryEdges::default();
    let mut covers = Vec::new();
    for (id, ring) in cells {
        let keys = boundary.add_cell(id, ring)?;
        covers.push(CellCover::new(id, keys));
    }
    check_overlaps(&mut covers)?;
    let rings = trace_rings(boundary)?;
    tracing::debug!(cells = covers.len(), rings = rings.len(), "dissolved selection");
    Ok(rings)
}
