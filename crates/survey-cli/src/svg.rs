//! SVG preview of the selection and its merged outline.

use survey_core::{extent, CellView, Extent, Ring, StyleSettings};

const PADDING_PX: f64 = 10.0;
const CELL_STROKE_PX: f64 = 1.0;

/// Maps survey coordinates into the picture, y pointing down.
struct Viewport {
    area: Extent,
    scale: f64,
}

impl Viewport {
    fn fit(area: Extent, size_px: f64) -> Self {
        let span = area.width().max(area.height());
        let scale = if span > 0.0 { size_px / span } else { 1.0 };
        Self { area, scale }
    }

    fn width_px(&self) -> f64 {
        self.area.width() * self.scale + 2.0 * PADDING_PX
    }

    fn height_px(&self) -> f64 {
        self.area.height() * self.scale + 2.0 * PADDING_PX
    }

    fn points(&self, ring: &[[f64; 2]]) -> String {
        ring.iter()
            .map(|[x, y]| {
                let px = (x - self.area.min_x) * self.scale + PADDING_PX;
                let py = (self.area.max_y - y) * self.scale + PADDING_PX;
                format!("{px:.2},{py:.2}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn drawing_extent(cells: &[CellView], outline: &[Ring]) -> Option<Extent> {
    cells
        .iter()
        .map(|view| &view.ring)
        .chain(outline.iter())
        .filter_map(|ring| extent(ring))
        .reduce(|a, b| a.union(&b))
}

/// Render cells (flagged ones in the flagged fill) and the outline on top.
/// `size_px` is the length of the longer side, padding excluded.
pub fn render(cells: &[CellView], outline: &[Ring], style: &StyleSettings, size_px: f64) -> String {
    let Some(area) = drawing_extent(cells, outline) else {
        return format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" viewBox="0 0 {w} {w}"/>"#,
            w = 2.0 * PADDING_PX
        );
    };
    let view = Viewport::fit(area, size_px);
    let (w, h) = (view.width_px(), view.height_px());

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.2} {h:.2}">"#
    );
    svg.push('\n');

    svg.push_str("<g id=\"cells\">\n");
    for cell in cells {
        let fill = if cell.is_valid() {
            &style.cell_fill
        } else {
            &style.flagged_fill
        };
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"{}\"><title>{}</title></polygon>\n",
            view.points(&cell.ring),
            fill,
            style.cell_fill_opacity,
            style.cell_stroke,
            CELL_STROKE_PX,
            cell.id
        ));
    }
    svg.push_str("</g>\n");

    svg.push_str("<g id=\"outline\">\n");
    for ring in outline {
        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"/>\n",
            view.points(ring),
            style.outline_stroke,
            style.outline_width_px
        ));
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{CellShape, CoordinateSystem, FlightParameters, SurveyEngine};

    fn engine_with_two_cells() -> SurveyEngine {
        let mut engine =
            SurveyEngine::new(FlightParameters::default(), CoordinateSystem::Projected).unwrap();
        for x in [0.0, 100.0] {
            engine
                .select_shape(CellShape::Rectangle {
                    min: [x, 0.0],
                    max: [x + 100.0, 100.0],
                })
                .unwrap();
        }
        engine
    }

    #[test]
    fn draws_cells_and_outline() {
        let mut engine = engine_with_two_cells();
        let style = StyleSettings::default();
        let svg = render(&engine.cell_views(), &engine.merged_outline(), &style, 200.0);

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polygon").count(), 3);
        assert!(svg.contains(&style.outline_stroke));
        // 200 m wide at 1 px/m plus padding
        assert!(svg.contains("width=\"220\""));
    }

    #[test]
    fn flagged_cells_use_flagged_fill() {
        let mut engine = engine_with_two_cells();
        let id = engine.cells().next().unwrap().id.clone();
        engine.set_cell_elevation(&id, 90.0, 10.0).unwrap();
        let style = StyleSettings::default();
        let svg = render(&engine.cell_views(), &engine.merged_outline(), &style, 200.0);
        assert_eq!(svg.matches(&style.flagged_fill).count(), 1);
    }

    #[test]
    fn y_axis_points_down() {
        let area = Extent {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 10.0,
            max_y: 10.0,
        };
        let view = Viewport::fit(area, 10.0);
        assert_eq!(view.points(&[[0.0, 10.0]]), "10.00,10.00");
        assert_eq!(view.points(&[[0.0, 0.0]]), "10.00,20.00");
    }

    #[test]
    fn empty_selection_gives_empty_picture() {
        let svg = render(&[], &[], &StyleSettings::default(), 200.0);
        assert!(!svg.contains("<polygon"));
    }
}
