use super::axes::{draw_category_labels, draw_value_grid, PlotArea, LABEL_SCALE};
use super::canvas::{Canvas, HAlign, VAlign};
use super::palette::{Color, Palette};
use super::{axis_maximum, format_value, ChartOptions, RasterImage};
use crate::report::ChartPoint;
use tracing::debug;

const AREA_ALPHA: f64 = 0.45;
const LINE_THICKNESS: u32 = 4;
const MARKER_RADIUS: i64 = 7;

/// Line chart over the points in order, with a shaded area underneath.
pub fn render_line(points: &[ChartPoint], palette: &Palette, options: &ChartOptions) -> Option<RasterImage> {
    let values: Vec<f64> = points
        .iter()
        .map(|point| point.value)
        .filter(|value| value.is_finite())
        .collect();
    if values.is_empty() {
        debug!(points = points.len(), "line chart skipped: no numeric data");
        return None;
    }

    let mut canvas = Canvas::new(options.width, options.height, Color::WHITE);
    let area = PlotArea::for_canvas(options.width, options.height);
    let axis_max = axis_maximum(&values, options);
    draw_value_grid(&mut canvas, &area, axis_max, options, palette);

    let vertices: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter(|(_, point)| point.value.is_finite())
        .map(|(index, point)| {
            (
                area.slot_center(index, points.len()),
                area.y_for(point.value.max(0.0), axis_max),
            )
        })
        .collect();

    if vertices.len() > 1 {
        let mut shaded = vertices.clone();
        if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            shaded.push((last.0, area.bottom as f64));
            shaded.push((first.0, area.bottom as f64));
        }
        canvas.fill_polygon(&shaded, palette.light, AREA_ALPHA);
        canvas.draw_polyline(&vertices, false, LINE_THICKNESS, palette.primary);
    }

    let finite = points.iter().filter(|point| point.value.is_finite());
    for ((x, y), point) in vertices.iter().zip(finite) {
        let (x, y) = (x.round() as i64, y.round() as i64);
        canvas.fill_circle(x, y, MARKER_RADIUS, palette.dark);
        canvas.fill_circle(x, y, MARKER_RADIUS - 3, Color::WHITE);
        canvas.draw_text_aligned(
            x,
            y - MARKER_RADIUS - 8,
            &format_value(point.value, options),
            LABEL_SCALE,
            palette.dark,
            HAlign::Center,
            VAlign::Bottom,
        );
    }

    draw_category_labels(
        &mut canvas,
        &area,
        points.iter().map(|point| point.label.as_str()),
    );

    let image = canvas.encode_jpeg(options.quality)?;
    debug!(
        points = points.len(),
        width = image.width,
        height = image.height,
        bytes = image.bytes.len(),
        "line chart rendered"
    );
    Some(image)
}
