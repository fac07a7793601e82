//! Regular survey grid that selectable cells are cut from.

use crate::error::InvalidParameterError;
use crate::geometry::contains_point;
use crate::models::{CellShape, CoordinateSystem};
use crate::units::{meters_to_lat, meters_to_lon};
use serde::{Deserialize, Serialize};

/// Column/row address of a grid cell, origin at the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub col: u32,
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyGrid {
    /// Minimum (south-west) corner of the grid
    pub origin: [f64; 2],
    /// Cell extent along x, in coordinate units
    pub cell_width: f64,
    /// Cell extent along y, in coordinate units
    pub cell_height: f64,
    pub cols: u32,
    pub rows: u32,
    #[serde(default)]
    pub crs: CoordinateSystem,
}

impl SurveyGrid {
    pub fn new(
        origin: [f64; 2],
        cell_width: f64,
        cell_height: f64,
        cols: u32,
        rows: u32,
        crs: CoordinateSystem,
    ) -> Result<Self, InvalidParameterError> {
        for (field, value) in [("grid_origin_x", origin[0]), ("grid_origin_y", origin[1])] {
            if !value.is_finite() {
                return Err(InvalidParameterError::NonFinite { field, value });
            }
        }
        for (field, value) in [
            ("cell_width", cell_width),
            ("cell_height", cell_height),
            ("cols", cols as f64),
            ("rows", rows as f64),
        ] {
            if !value.is_finite() {
                return Err(InvalidParameterError::NonFinite { field, value });
            }
            if value <= 0.0 {
                return Err(InvalidParameterError::NonPositive { field, value });
            }
        }
        Ok(Self {
            origin,
            cell_width,
            cell_height,
            cols,
            rows,
            crs,
        })
    }

    /// Grid of square cells `cell_size_m` on a side.
    ///
    /// For geographic grids the size is converted to degrees at the origin
    /// latitude, so cells are square on the ground near the origin.
    pub fn with_cell_size_m(
        origin: [f64; 2],
        cell_size_m: f64,
        cols: u32,
        rows: u32,
        crs: CoordinateSystem,
    ) -> Result<Self, InvalidParameterError> {
        let (w, h) = match crs {
            CoordinateSystem::Projected => (cell_size_m, cell_size_m),
            CoordinateSystem::Geographic => (
                meters_to_lon(cell_size_m, origin[1]),
                meters_to_lat(cell_size_m, origin[1]),
            ),
        };
        Self::new(origin, w, h, cols, rows, crs)
    }

    pub fn contains_index(&self, index: GridIndex) -> bool {
        index.col < self.cols && index.row < self.rows
    }

    /// Shape of the cell at `index`, if it lies on the grid.
    pub fn cell(&self, index: GridIndex) -> Option<CellShape> {
        if !self.contains_index(index) {
            return None;
        }
        let x0 = self.origin[0] + index.col as f64 * self.cell_width;
        let y0 = self.origin[1] + index.row as f64 * self.cell_height;
        Some(CellShape::Rectangle {
            min: [x0, y0],
            max: [x0 + self.cell_width, y0 + self.cell_height],
        })
    }

    /// Cell under a map click at `(x, y)`.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<GridIndex> {
        let fx = (x - self.origin[0]) / self.cell_width;
        let fy = (y - self.origin[1]) / self.cell_height;
        if !fx.is_finite() || !fy.is_finite() || fx < 0.0 || fy < 0.0 {
            return None;
        }
        let index = GridIndex {
            col: fx.floor() as u32,
            row: fy.floor() as u32,
        };
        self.contains_index(index).then_some(index)
    }

    fn center(&self, index: GridIndex) -> [f64; 2] {
        [
            self.origin[0] + (index.col as f64 + 0.5) * self.cell_width,
            self.origin[1] + (index.row as f64 + 0.5) * self.cell_height,
        ]
    }

    /// Every cell address, row by row.
    pub fn indices(&self) -> impl Iterator<Item = GridIndex> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| GridIndex { col, row }))
    }

    /// Cells whose centre falls inside `polygon` (e.g. a drawn survey area).
    pub fn cells_within(&self, polygon: &[[f64; 2]]) -> Vec<(GridIndex, CellShape)> {
        self.indices()
            .filter(|index| {
                let [cx, cy] = self.center(*index);
                contains_point(polygon, cx, cy)
            })
            .filter_map(|index| self.cell(index).map(|shape| (index, shape)))
            .collect()
    }
}
