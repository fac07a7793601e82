//! Recalculation graph: the single owner of survey inputs and derived values.
//!
//! Node kinds and their inputs:
//!
//! ```text
//! FlightParameters ──► DerivedFootprint ──► TerrainResult (per cell) ◄── cell elevation
//! SelectionSet (membership + validity) ──► MergedOutline
//! ```
//!
//! Edits only mark nodes dirty. Reads pull: a dirty node is recomputed
//! synchronously (after its own dependencies) before its value is returned,
//! so callers never see a stale or half-updated value. A recompute that
//! yields the previous value keeps its revision, which is what makes
//! [`SurveyEngine::publish`] idempotent.

use crate::dissolve::dissolve;
use crate::error::{DissolveError, EngineError, InvalidParameterError, MalformedCellError};
use crate::geometry::area_m2;
use crate::models::{
    CellElevation, CellId, CellRing, CellShape, CellTerrain, CoordinateSystem, DerivedFootprint,
    FlightParameters, FlightParametersUpdate, GridCell, RingDefect, Ring,
};
use crate::photogrammetry::{derive_footprint, validate};
use crate::terrain::{evaluate_cell, TerrainSummary};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Receives derived values as they change. Implemented by renderers and
/// exporters; they get copies and never write back.
pub trait SurveySink {
    fn footprint_changed(&mut self, footprint: &DerivedFootprint);
    fn cell_changed(&mut self, cell: &GridCell, terrain: &CellTerrain);
    fn cell_removed(&mut self, id: &CellId);
    /// Empty when nothing is selected or the dissolve failed.
    fn outline_changed(&mut self, outline: &[Ring]);
}

#[derive(Debug, Clone)]
struct Node<T> {
    /// Last computed value; only read while clean
    value: Option<T>,
    dirty: bool,
    revision: u64,
}

impl<T: PartialEq> Node<T> {
    fn dirty() -> Self {
        Self {
            value: None,
            dirty: true,
            revision: 0,
        }
    }

    fn invalidate(&mut self) {
        self.dirty = true;
    }

    fn clean(&self) -> Option<&T> {
        if self.dirty {
            None
        } else {
            self.value.as_ref()
        }
    }

    /// Store a fresh value. Returns the previous one. The revision only moves
    /// when the value actually changed.
    fn store(&mut self, value: T, counter: &mut u64) -> Option<T> {
        self.dirty = false;
        if self.value.as_ref() != Some(&value) {
            *counter += 1;
            self.revision = *counter;
        }
        self.value.replace(value)
    }
}

#[derive(Debug, Clone)]
struct CellEntry {
    cell: GridCell,
    terrain: Node<CellTerrain>,
    input_revision: u64,
}

impl CellEntry {
    /// Flagged cells are decided from inputs alone so the outline never has
    /// to wait on terrain.
    fn is_flagged(&self) -> bool {
        self.cell
            .elevation
            .is_some_and(|e| e.min_height > e.max_height)
    }

    fn revision(&self) -> u64 {
        self.terrain.revision.max(self.input_revision)
    }
}

#[derive(Debug, Clone, Default)]
struct Published {
    footprint: Option<u64>,
    outline: Option<u64>,
    cells: BTreeMap<CellId, u64>,
    removed: BTreeSet<CellId>,
}

/// Read-only copy of one selected cell and its derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub id: CellId,
    pub shape: CellShape,
    /// Closed ring
    pub ring: Ring,
    pub elevation: Option<CellElevation>,
    pub terrain: CellTerrain,
    pub area_m2: f64,
}

impl CellView {
    pub fn is_valid(&self) -> bool {
        !self.terrain.is_flagged()
    }
}

#[derive(Debug, Clone)]
pub struct SurveyEngine {
    params: FlightParameters,
    crs: CoordinateSystem,
    footprint: Node<DerivedFootprint>,
    cells: BTreeMap<CellId, CellEntry>,
    outline: Node<Result<Vec<Ring>, DissolveError>>,
    revision_counter: u64,
    published: Published,
}

impl Default for SurveyEngine {
    fn default() -> Self {
        Self::with_validated(FlightParameters::default(), CoordinateSystem::default())
    }
}

impl SurveyEngine {
    /// Create an engine with no selected cells.
    pub fn new(
        params: FlightParameters,
        crs: CoordinateSystem,
    ) -> Result<Self, InvalidParameterError> {
        validate(&params)?;
        Ok(Self::with_validated(params, crs))
    }

    fn with_validated(params: FlightParameters, crs: CoordinateSystem) -> Self {
        Self {
            params,
            crs,
            footprint: Node::dirty(),
            cells: BTreeMap::new(),
            outline: Node::dirty(),
            revision_counter: 0,
            published: Published::default(),
        }
    }

    pub fn flight_parameters(&self) -> &FlightParameters {
        &self.params
    }

    pub fn crs(&self) -> CoordinateSystem {
        self.crs
    }

    // ---------- flight parameters ----------

    /// Apply a partial edit. Invalid input is rejected and the previous
    /// parameters stay in force.
    pub fn set_flight_parameters(
        &mut self,
        update: &FlightParametersUpdate,
    ) -> Result<DerivedFootprint, InvalidParameterError> {
        let next = update.apply_to(&self.params);
        self.replace_flight_parameters(next)
    }

    /// Replace all flight parameters at once.
    pub fn replace_flight_parameters(
        &mut self,
        params: FlightParameters,
    ) -> Result<DerivedFootprint, InvalidParameterError> {
        validate(&params)?;
        if params != self.params {
            tracing::debug!("flight parameters changed");
            self.params = params;
            self.footprint.invalidate();
        }
        Ok(self.footprint())
    }

    /// Current footprint, recomputed first if any parameter changed.
    pub fn footprint(&mut self) -> DerivedFootprint {
        if let Some(value) = self.footprint.clean() {
            return *value;
        }
        let value = derive_footprint(&self.params);
        tracing::debug!(flight_height_m = value.flight_height_m, "recomputed footprint");
        let previous = self.footprint.store(value, &mut self.revision_counter);
        let height_changed = previous
            .map_or(true, |p| p.flight_height_m.to_bits() != value.flight_height_m.to_bits());
        if height_changed {
            for entry in self.cells.values_mut() {
                entry.terrain.invalidate();
            }
        }
        value
    }

    // ---------- selection ----------

    /// Select a cell. The identity must be the one derived from the shape's
    /// origin corner. Returns false if the cell was already selected, in which
    /// case its terrain inputs are kept. A different shape under an identity
    /// that is already selected is refused.
    pub fn select_cell(&mut self, id: CellId, shape: CellShape) -> Result<bool, EngineError> {
        let ring = shape_ring(&id, &shape)?;
        let expected = CellId::from_ring(&ring);
        if expected != id {
            return Err(EngineError::IdentityMismatch {
                given: id,
                expected,
            });
        }
        if let Some(entry) = self.cells.get(&id) {
            if entry.cell.ring != ring {
                return Err(EngineError::ShapeConflict(id));
            }
            return Ok(false);
        }

        self.revision_counter += 1;
        let entry = CellEntry {
            cell: GridCell {
                id: id.clone(),
                shape,
                ring,
                elevation: None,
            },
            terrain: Node::dirty(),
            input_revision: self.revision_counter,
        };
        tracing::debug!(cell = %id, "selected cell");
        self.published.removed.remove(&id);
        self.cells.insert(id, entry);
        self.outline.invalidate();
        Ok(true)
    }

    /// Select a shape under its derived identity.
    pub fn select_shape(&mut self, shape: CellShape) -> Result<CellId, EngineError> {
        let id = shape
            .cell_id()
            .map_err(|defect| malformed(&CellId::from("<unnamed>"), defect))?;
        self.select_cell(id.clone(), shape)?;
        Ok(id)
    }

    /// Deselect a cell, discarding its terrain inputs. Returns false if it
    /// was not selected.
    pub fn deselect_cell(&mut self, id: &CellId) -> bool {
        if self.cells.remove(id).is_none() {
            return false;
        }
        tracing::debug!(cell = %id, "deselected cell");
        if self.published.cells.remove(id).is_some() {
            self.published.removed.insert(id.clone());
        }
        self.outline.invalidate();
        true
    }

    /// Click-to-toggle. Returns whether the cell is selected afterwards.
    pub fn toggle_cell(&mut self, shape: CellShape) -> Result<bool, EngineError> {
        let ring = shape_ring(&CellId::from("<unnamed>"), &shape)?;
        let id = CellId::from_ring(&ring);
        let same_shape = self.cells.get(&id).map(|entry| entry.cell.ring == ring);
        match same_shape {
            Some(false) => Err(EngineError::ShapeConflict(id)),
            Some(true) => Ok(!self.deselect_cell(&id)),
            None => self.select_cell(id, shape),
        }
    }

    pub fn is_selected(&self, id: &CellId) -> bool {
        self.cells.contains_key(id)
    }

    pub fn cell(&self, id: &CellId) -> Option<&GridCell> {
        self.cells.get(id).map(|entry| &entry.cell)
    }

    /// Selected cells in identity order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.values().map(|entry| &entry.cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // ---------- terrain ----------

    /// Enter a cell's elevation range. An inverted range is stored and
    /// flagged rather than rejected, so the operator can fix it in place.
    pub fn set_cell_elevation(
        &mut self,
        id: &CellId,
        min_height: f64,
        max_height: f64,
    ) -> Result<CellTerrain, EngineError> {
        if !min_height.is_finite() || !max_height.is_finite() {
            return Err(EngineError::NonFiniteElevation(id.clone()));
        }
        let entry = self
            .cells
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownCell(id.clone()))?;

        let elevation = CellElevation {
            min_height,
            max_height,
        };
        if entry.cell.elevation != Some(elevation) {
            let was_flagged = entry.is_flagged();
            entry.cell.elevation = Some(elevation);
            entry.terrain.invalidate();
            self.revision_counter += 1;
            entry.input_revision = self.revision_counter;
            if entry.is_flagged() != was_flagged {
                self.outline.invalidate();
            }
            if entry.is_flagged() {
                tracing::warn!(cell = %id, min_height, max_height, "inverted elevation range");
            }
        }
        self.cell_terrain(id)
            .ok_or_else(|| EngineError::UnknownCell(id.clone()))
    }

    /// Remove a cell's elevation input.
    pub fn clear_cell_elevation(&mut self, id: &CellId) -> Result<(), EngineError> {
        let entry = self
            .cells
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownCell(id.clone()))?;
        let was_flagged = entry.is_flagged();
        if entry.cell.elevation.take().is_some() {
            entry.terrain.invalidate();
            self.revision_counter += 1;
            entry.input_revision = self.revision_counter;
            if was_flagged {
                self.outline.invalidate();
            }
        }
        Ok(())
    }

    /// Terrain state of one cell, recomputed first if stale.
    pub fn cell_terrain(&mut self, id: &CellId) -> Option<CellTerrain> {
        let flight_height_m = self.footprint().flight_height_m;
        let entry = self.cells.get_mut(id)?;
        Some(refresh_terrain(
            entry,
            flight_height_m,
            &mut self.revision_counter,
        ))
    }

    fn refresh_all_terrain(&mut self) {
        let flight_height_m = self.footprint().flight_height_m;
        for entry in self.cells.values_mut() {
            refresh_terrain(entry, flight_height_m, &mut self.revision_counter);
        }
    }

    /// Plain/variable/flagged counts and absolute-height range.
    pub fn terrain_summary(&mut self) -> TerrainSummary {
        self.refresh_all_terrain();
        let mut summary = TerrainSummary::default();
        for entry in self.cells.values() {
            if let Some(terrain) = entry.terrain.clean() {
                summary.add(terrain);
            }
        }
        summary
    }

    /// Total area of selected cells that are not flagged, in m².
    pub fn selected_area_m2(&self) -> f64 {
        self.cells
            .values()
            .filter(|entry| !entry.is_flagged())
            .map(|entry| area_m2(&entry.cell.ring, self.crs))
            .sum()
    }

    /// Snapshot of every selected cell with up-to-date terrain.
    pub fn cell_views(&mut self) -> Vec<CellView> {
        self.refresh_all_terrain();
        self.cells
            .values()
            .map(|entry| CellView {
                id: entry.cell.id.clone(),
                shape: entry.cell.shape.clone(),
                ring: entry.cell.closed_ring(),
                elevation: entry.cell.elevation,
                terrain: entry.terrain.clean().copied().unwrap_or(CellTerrain::Unset),
                area_m2: area_m2(&entry.cell.ring, self.crs),
            })
            .collect()
    }

    // ---------- outline ----------

    /// Dissolved outline of all valid selected cells, or the reason it could
    /// not be traced.
    pub fn outline_result(&mut self) -> Result<Vec<Ring>, DissolveError> {
        if let Some(value) = self.outline.clean() {
            return value.clone();
        }
        let result = dissolve(
            self.cells
                .values()
                .filter(|entry| !entry.is_flagged())
                .map(|entry| (&entry.cell.id, &entry.cell.ring)),
        );
        if let Err(err) = &result {
            tracing::warn!(error = %err, "merged outline unavailable");
        }
        self.outline
            .store(result.clone(), &mut self.revision_counter);
        result
    }

    /// Merged outline; empty when nothing is selected or dissolve failed.
    pub fn merged_outline(&mut self) -> Vec<Ring> {
        self.outline_result().unwrap_or_default()
    }

    // ---------- recompute & publish ----------

    /// Bring every node up to date: footprint, then terrain, then outline.
    pub fn recompute_all(&mut self) {
        self.footprint();
        self.refresh_all_terrain();
        // A failed dissolve is recorded in the outline node and logged.
        let _ = self.outline_result();
    }

    /// Number of nodes currently waiting for a recompute.
    ///
    /// Flight edits pull the footprint before returning, so a flight height
    /// change is already visible here as one dirty terrain node per cell.
    pub fn dirty_nodes(&self) -> usize {
        let cells = self
            .cells
            .values()
            .filter(|entry| entry.terrain.dirty)
            .count();
        cells + usize::from(self.footprint.dirty) + usize::from(self.outline.dirty)
    }

    /// Recompute what is stale and push everything the sink has not seen yet.
    /// Returns the number of notifications sent; zero when nothing changed
    /// since the last call.
    pub fn publish(&mut self, sink: &mut dyn SurveySink) -> usize {
        self.recompute_all();
        let mut sent = 0;

        for id in std::mem::take(&mut self.published.removed) {
            sink.cell_removed(&id);
            sent += 1;
        }

        if self.published.footprint != Some(self.footprint.revision) {
            if let Some(footprint) = self.footprint.clean() {
                sink.footprint_changed(footprint);
                self.published.footprint = Some(self.footprint.revision);
                sent += 1;
            }
        }

        for (id, entry) in &self.cells {
            let revision = entry.revision();
            if self.published.cells.get(id) == Some(&revision) {
                continue;
            }
            if let Some(terrain) = entry.terrain.clean() {
                sink.cell_changed(&entry.cell, terrain);
                self.published.cells.insert(id.clone(), revision);
                sent += 1;
            }
        }

        if self.published.outline != Some(self.outline.revision) {
            if let Some(outline) = self.outline.clean() {
                let rings: &[Ring] = match outline {
                    Ok(rings) => rings,
                    Err(_) => &[],
                };
                sink.outline_changed(rings);
                self.published.outline = Some(self.outline.revision);
                sent += 1;
            }
        }

        sent
    }
}

fn refresh_terrain(entry: &mut CellEntry, flight_height_m: f64, counter: &mut u64) -> CellTerrain {
    if let Some(terrain) = entry.terrain.clean() {
        return *terrain;
    }
    let terrain = evaluate_cell(entry.cell.elevation.as_ref(), flight_height_m);
    tracing::debug!(cell = %entry.cell.id, ?terrain, "recomputed cell terrain");
    entry.terrain.store(terrain, counter);
    terrain
}

fn shape_ring(id: &CellId, shape: &CellShape) -> Result<CellRing, EngineError> {
    shape.ring().map_err(|defect| malformed(id, defect))
}

fn malformed(id: &CellId, defect: RingDefect) -> EngineError {
    let id = id.to_string();
    match defect {
        RingDefect::VertexCount(count) => MalformedCellError::VertexCount { id, count },
        RingDefect::NonFinite => MalformedCellError::NonFiniteVertex { id },
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReliefType;

    #[derive(Default)]
    struct RecordingSink {
        footprints: usize,
        cells: Vec<CellId>,
        removed: Vec<CellId>,
        outlines: Vec<usize>,
    }

    impl SurveySink for RecordingSink {
        fn footprint_changed(&mut self, _footprint: &DerivedFootprint) {
            self.footprints += 1;
        }

        fn cell_changed(&mut self, cell: &GridCell, _terrain: &CellTerrain) {
            self.cells.push(cell.id.clone());
        }

        fn cell_removed(&mut self, id: &CellId) {
            self.removed.push(id.clone());
        }

        fn outline_changed(&mut self, outline: &[Ring]) {
            self.outlines.push(outline.len());
        }
    }

    fn projected() -> SurveyEngine {
        SurveyEngine::new(FlightParameters::default(), CoordinateSystem::Projected).unwrap()
    }

    fn square(x: f64, y: f64) -> CellShape {
        CellShape::Rectangle {
            min: [x, y],
            max: [x + 100.0, y + 100.0],
        }
    }

    #[test]
    fn edits_mark_dirty_and_reads_pull() {
        let mut engine = projected();
        assert_eq!(engine.dirty_nodes(), 2);

        engine.select_shape(square(0.0, 0.0)).unwrap();
        assert_eq!(engine.dirty_nodes(), 3);
        engine.recompute_all();
        assert_eq!(engine.dirty_nodes(), 0);

        // speed does not move the flight height, so terrain stays clean
        engine
            .set_flight_parameters(&FlightParametersUpdate {
                speed_kmh: Some(180.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(engine.dirty_nodes(), 0);

        engine
            .set_flight_parameters(&FlightParametersUpdate {
                image_scale: Some(20_000.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(engine.dirty_nodes(), 1);
        engine.terrain_summary();
        assert_eq!(engine.dirty_nodes(), 0);
    }

    #[test]
    fn height_edit_marks_every_terrain_node() {
        let mut engine = projected();
        for x in [0.0, 100.0, 200.0] {
            engine.select_shape(square(x, 0.0)).unwrap();
        }
        engine.recompute_all();

        engine
            .set_flight_parameters(&FlightParametersUpdate {
                focal_length_mm: Some(150.0),
                ..Default::default()
            })
            .unwrap();
        // footprint already pulled, outline untouched
        assert!(!engine.footprint.dirty);
        assert_eq!(engine.dirty_nodes(), 3);
    }

    #[test]
    fn invalid_edit_keeps_previous_state() {
        let mut engine = projected();
        let before = engine.footprint();
        let err = engine
            .set_flight_parameters(&FlightParametersUpdate {
                focal_length_mm: Some(0.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, InvalidParameterError::NonPositive { .. }));
        assert_eq!(engine.flight_parameters(), &FlightParameters::default());
        assert_eq!(engine.footprint(), before);
        assert_eq!(engine.dirty_nodes(), 1); // only the untouched outline
    }

    #[test]
    fn recompute_without_edits_changes_nothing() {
        let mut engine = projected();
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        engine.set_cell_elevation(&id, 120.0, 480.0).unwrap();
        engine.recompute_all();
        let views = engine.cell_views();
        let outline = engine.merged_outline();

        engine
            .replace_flight_parameters(FlightParameters::default())
            .unwrap();
        engine.recompute_all();
        assert_eq!(engine.cell_views(), views);
        assert_eq!(engine.merged_outline(), outline);
    }

    #[test]
    fn publish_sends_only_changes() {
        let mut engine = projected();
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        engine.set_cell_elevation(&id, 10.0, 20.0).unwrap();

        let mut sink = RecordingSink::default();
        assert_eq!(engine.publish(&mut sink), 3);
        assert_eq!(sink.footprints, 1);
        assert_eq!(sink.cells, vec![id.clone()]);
        assert_eq!(sink.outlines, vec![1]);

        assert_eq!(engine.publish(&mut sink), 0);

        engine.deselect_cell(&id);
        assert_eq!(engine.publish(&mut sink), 2);
        assert_eq!(sink.removed, vec![id]);
        assert_eq!(sink.outlines, vec![1, 0]);
    }

    #[test]
    fn select_then_deselect_before_publish_is_silent() {
        let mut engine = projected();
        let mut sink = RecordingSink::default();
        engine.publish(&mut sink);

        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        engine.deselect_cell(&id);
        assert_eq!(engine.publish(&mut sink), 0);
        assert!(sink.removed.is_empty());
    }

    #[test]
    fn inverted_range_is_flagged_and_excluded_until_fixed() {
        let mut engine = projected();
        let a = engine.select_shape(square(0.0, 0.0)).unwrap();
        let b = engine.select_shape(square(100.0, 0.0)).unwrap();
        engine.set_cell_elevation(&a, 10.0, 20.0).unwrap();

        let flagged = engine.set_cell_elevation(&b, 50.0, 30.0).unwrap();
        assert!(flagged.is_flagged());
        assert!(engine.is_selected(&b));
        assert_eq!(engine.selected_area_m2(), 10_000.0);
        assert_eq!(engine.merged_outline()[0].len(), 5);
        assert_eq!(engine.terrain_summary().flagged_cells, 1);

        let fixed = engine.set_cell_elevation(&b, 50.0, 60.0).unwrap();
        let result = fixed.result().copied().unwrap();
        assert_eq!(result.mean_height, 55.0);
        assert_eq!(result.absolute_height, 2_855.0);
        assert_eq!(result.relief, ReliefType::Plain);
        assert_eq!(engine.selected_area_m2(), 20_000.0);

        let outline = engine.merged_outline();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].len(), 5);
    }

    #[test]
    fn corrected_cell_follows_later_flight_edit() {
        let mut engine = projected();
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        engine.set_cell_elevation(&id, 50.0, 30.0).unwrap();

        engine
            .set_flight_parameters(&FlightParametersUpdate {
                image_scale: Some(20_000.0),
                ..Default::default()
            })
            .unwrap();
        let terrain = engine.set_cell_elevation(&id, 30.0, 60.0).unwrap();
        // 20 000 × 112 mm = 2240 m
        assert_eq!(terrain.result().unwrap().absolute_height, 2_240.0 + 45.0);
    }

    #[test]
    fn clearing_a_flagged_range_restores_the_cell() {
        let mut engine = projected();
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        engine.set_cell_elevation(&id, 50.0, 30.0).unwrap();
        assert!(engine.merged_outline().is_empty());

        engine.clear_cell_elevation(&id).unwrap();
        assert_eq!(engine.cell_terrain(&id), Some(CellTerrain::Unset));
        assert_eq!(engine.merged_outline().len(), 1);
    }

    #[test]
    fn identity_must_match_shape_origin() {
        let mut engine = projected();
        let err = engine
            .select_cell(CellId::from("somewhere"), square(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::IdentityMismatch { .. }));
        assert!(engine.is_empty());

        let id = CellId::from_origin(0.0, 0.0);
        assert!(engine.select_cell(id.clone(), square(0.0, 0.0)).unwrap());
        assert!(!engine.select_cell(id, square(0.0, 0.0)).unwrap());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn other_shape_at_a_selected_origin_is_refused() {
        let mut engine = projected();
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        let larger = CellShape::Rectangle {
            min: [0.0, 0.0],
            max: [200.0, 200.0],
        };
        assert_eq!(
            engine.select_cell(id.clone(), larger.clone()),
            Err(EngineError::ShapeConflict(id.clone()))
        );
        assert_eq!(
            engine.toggle_cell(larger),
            Err(EngineError::ShapeConflict(id.clone()))
        );
        assert!(engine.is_selected(&id));
        assert_eq!(engine.cell(&id).unwrap().shape, square(0.0, 0.0));
    }

    #[test]
    fn toggle_flips_membership() {
        let mut engine = projected();
        assert!(engine.toggle_cell(square(0.0, 0.0)).unwrap());
        assert!(!engine.toggle_cell(square(0.0, 0.0)).unwrap());
        assert!(engine.is_empty());
    }

    #[test]
    fn elevation_edits_are_checked() {
        let mut engine = projected();
        let missing = CellId::from_origin(5.0, 5.0);
        assert_eq!(
            engine.set_cell_elevation(&missing, 1.0, 2.0),
            Err(EngineError::UnknownCell(missing.clone()))
        );
        let id = engine.select_shape(square(0.0, 0.0)).unwrap();
        assert_eq!(
            engine.set_cell_elevation(&id, f64::NAN, 2.0),
            Err(EngineError::NonFiniteElevation(id.clone()))
        );
        assert_eq!(engine.cell(&id).unwrap().elevation, None);
    }
}
