use super::canvas::{Canvas, HAlign, VAlign};
use super::palette::{Color, Palette};
use super::{axis_maximum, format_value, ChartOptions, RasterImage};
use crate::report::{truncate_label, SectionScore};
use std::f64::consts::PI;
use tracing::debug;

/// Fewer axes than this cannot form a polygon.
pub const RADAR_MIN_AXES: usize = 3;

const POLYGON_ALPHA: f64 = 0.35;
const AXIS_LABEL_LIMIT: usize = 18;
const LABEL_GAP: f64 = 18.0;

/// Angle in radians of axis `index` out of `count`, starting at twelve
/// o'clock and advancing clockwise in screen coordinates (y grows down).
fn axis_angle(index: usize, count: usize) -> f64 {
    -PI / 2.0 + index as f64 * 2.0 * PI / count.max(1) as f64
}

/// Polygon vertices for `fractions` (each clamped to 0..=1) around a centre.
pub fn radar_vertices(count: usize, cx: f64, cy: f64, radius: f64, fractions: &[f64]) -> Vec<(f64, f64)> {
    (0..count)
        .map(|index| {
            let fraction = fractions
                .get(index)
                .copied()
                .filter(|value| value.is_finite())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0);
            let angle = axis_angle(index, count);
            (
                cx + angle.cos() * radius * fraction,
                cy + angle.sin() * radius * fraction,
            )
        })
        .collect()
}

/// Text anchor that keeps an axis label outside the plot.
pub fn label_anchor(angle: f64) -> (HAlign, VAlign) {
    let (sin, cos) = angle.sin_cos();
    let horizontal = if cos > 0.25 {
        HAlign::Left
    } else if cos < -0.25 {
        HAlign::Right
    } else {
        HAlign::Center
    };
    let vertical = if sin > 0.25 {
        VAlign::Top
    } else if sin < -0.25 {
        VAlign::Bottom
    } else {
        VAlign::Middle
    };
    (horizontal, vertical)
}

pub fn render_radar(sections: &[SectionScore], palette: &Palette, options: &ChartOptions) -> Option<RasterImage> {
    if sections.len() < RADAR_MIN_AXES {
        debug!(axes = sections.len(), "radar chart skipped: too few axes");
        return None;
    }
    let values: Vec<f64> = sections.iter().map(|section| section.score).collect();
    if !values.iter().any(|value| value.is_finite()) {
        debug!(axes = sections.len(), "radar chart skipped: no numeric data");
        return None;
    }

    let count = sections.len();
    let axis_max = axis_maximum(&values, options);
    let mut canvas = Canvas::new(options.width, options.height, Color::WHITE);
    let (width, height) = (options.width as f64, options.height as f64);
    let (cx, cy) = (width / 2.0, height / 2.0);
    let radius = (width.min(height) / 2.0 - 150.0).max(width.min(height) / 4.0);

    let steps = options.steps();
    let ring = palette.light.darken(0.1);
    for level in 1..=steps {
        let fraction = level as f64 / steps as f64;
        let outline = radar_vertices(count, cx, cy, radius, &vec![fraction; count]);
        canvas.draw_polyline(&outline, true, 1, if level == steps { palette.dark } else { ring });
    }

    for (x, y) in radar_vertices(count, cx, cy, radius, &vec![1.0; count]) {
        canvas.draw_line(cx.round() as i64, cy.round() as i64, x.round() as i64, y.round() as i64, 1, ring);
    }

    for level in 1..=steps {
        let value = axis_max * level as f64 / steps as f64;
        let y = cy - radius * level as f64 / steps as f64;
        canvas.draw_text_aligned(
            cx.round() as i64 + 6,
            y.round() as i64,
            &format_value(value, &ChartOptions { decimals: 0, ..options.clone() }),
            1,
            Color::MUTED,
            HAlign::Left,
            VAlign::Middle,
        );
    }

    let fractions: Vec<f64> = values.iter().map(|value| value / axis_max).collect();
    let polygon = radar_vertices(count, cx, cy, radius, &fractions);
    canvas.fill_polygon(&polygon, palette.primary, POLYGON_ALPHA);
    canvas.draw_polyline(&polygon, true, 3, palette.dark);

    for (index, ((x, y), section)) in polygon.iter().zip(sections).enumerate() {
        let (x, y) = (x.round() as i64, y.round() as i64);
        canvas.fill_circle(x, y, 5, palette.dark);

        let angle = axis_angle(index, count);
        if section.score.is_finite() {
            canvas.draw_text_aligned(
                x,
                y - 10,
                &format_value(section.score, options),
                2,
                palette.dark,
                HAlign::Center,
                VAlign::Bottom,
            );
        }

        let (h_align, v_align) = label_anchor(angle);
        let label_x = cx + angle.cos() * (radius + LABEL_GAP);
        let label_y = cy + angle.sin() * (radius + LABEL_GAP);
        canvas.draw_text_aligned(
            label_x.round() as i64,
            label_y.round() as i64,
            &truncate_label(&section.label, AXIS_LABEL_LIMIT),
            2,
            Color::TEXT,
            h_align,
            v_align,
        );
    }

    let image = canvas.encode_jpeg(options.quality)?;
    debug!(
        axes = count,
        width = image.width,
        height = image.height,
        bytes = image.bytes.len(),
        "radar chart rendered"
    );
    Some(image)
}
