//! Rendering style for the survey layer.
//!
//! Plain data persisted with a project and handed to renderers. The engine
//! never reads it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    /// Fill of valid selected cells, `#rrggbb`
    pub cell_fill: String,
    pub cell_fill_opacity: f64,
    /// Thin border drawn around every selected cell
    pub cell_stroke: String,
    /// Fill of cells flagged with an inverted elevation range
    pub flagged_fill: String,
    /// Thick border drawn along the merged outline
    pub outline_stroke: String,
    pub outline_width_px: f64,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            cell_fill: "#3388ff".to_string(),
            cell_fill_opacity: 0.35,
            cell_stroke: "#1f4e99".to_string(),
            flagged_fill: "#e03131".to_string(),
            outline_stroke: "#ff8c00".to_string(),
            outline_width_px: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let style: StyleSettings =
            serde_json::from_str(r##"{"outline_stroke": "#000000"}"##).unwrap();
        assert_eq!(style.outline_stroke, "#000000");
        assert_eq!(style.outline_width_px, StyleSettings::default().outline_width_px);
    }
}
