//! GeoJSON-style feature export for the selected survey area.

use crate::engine::{CellView, SurveyEngine};
use crate::models::{CellTerrain, Ring};
use crate::units::present;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    #[default]
    FeatureCollection,
}

/// Polygon coordinates follow RFC 7946: closed rings of `[x, y]` positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

/// Value of the `kind` property on the aggregate feature.
pub const SELECTED_AREA_KIND: &str = "selected_area";
/// Value of the `kind` property on per-cell features.
pub const CELL_KIND: &str = "cell";

fn cell_feature(view: &CellView) -> Feature {
    let mut properties = Map::new();
    properties.insert("kind".into(), json!(CELL_KIND));
    properties.insert("id".into(), json!(view.id));
    properties.insert("area_m2".into(), json!(present(view.area_m2)));
    properties.insert(
        "min_height".into(),
        json!(view.elevation.map(|e| e.min_height)),
    );
    properties.insert(
        "max_height".into(),
        json!(view.elevation.map(|e| e.max_height)),
    );

    let result = match &view.terrain {
        CellTerrain::Computed(result) => Some(result),
        _ => None,
    };
    properties.insert("mean_height".into(), json!(result.map(|r| r.mean_height)));
    properties.insert(
        "absolute_height".into(),
        json!(result.map(|r| present(r.absolute_height))),
    );
    properties.insert(
        "elevation_difference".into(),
        json!(result.map(|r| present(r.elevation_difference))),
    );
    properties.insert(
        "relief".into(),
        json!(result.map(|r| r.relief.to_string())),
    );

    Feature {
        kind: FeatureType::Feature,
        geometry: Some(Geometry::Polygon {
            coordinates: vec![view.ring.clone()],
        }),
        properties,
    }
}

fn outline_geometry(outline: Vec<Ring>) -> Option<Geometry> {
    match outline.len() {
        0 => None,
        1 => Some(Geometry::Polygon {
            coordinates: outline,
        }),
        _ => Some(Geometry::MultiPolygon {
            coordinates: outline.into_iter().map(|ring| vec![ring]).collect(),
        }),
    }
}

impl SurveyEngine {
    /// One feature per valid selected cell, then one aggregate feature whose
    /// geometry is the merged outline and whose properties carry the
    /// footprint values.
    pub fn export_features(&mut self) -> Vec<Feature> {
        let views = self.cell_views();
        let mut features: Vec<Feature> = views
            .iter()
            .filter(|view| view.is_valid())
            .map(cell_feature)
            .collect();

        let footprint = self.footprint().rounded();
        let mut properties = match serde_json::to_value(footprint) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        properties.insert("kind".into(), json!(SELECTED_AREA_KIND));
        properties.insert("cell_count".into(), json!(features.len()));
        properties.insert(
            "selected_area_m2".into(),
            json!(present(self.selected_area_m2())),
        );

        let outline = self.merged_outline();
        features.push(Feature {
            kind: FeatureType::Feature,
            geometry: outline_geometry(outline),
            properties,
        });
        features
    }

    pub fn feature_collection(&mut self) -> FeatureCollection {
        FeatureCollection {
            kind: FeatureCollectionType::FeatureCollection,
            features: self.export_features(),
        }
    }
}
