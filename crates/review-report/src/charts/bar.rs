use super::axes::{draw_category_labels, draw_value_grid, PlotArea, LABEL_SCALE};
use super::canvas::{Canvas, HAlign, VAlign};
use super::palette::{Color, Palette};
use super::{axis_maximum, format_value, ChartOptions, RasterImage};
use crate::report::ChartPoint;
use tracing::debug;

const BAR_FILL_RATIO: f64 = 0.62;
const BAR_MAX_WIDTH: f64 = 140.0;

/// Vertical bar chart, one bar per point in the given order.
pub fn render_bar(points: &[ChartPoint], palette: &Palette, options: &ChartOptions) -> Option<RasterImage> {
    let values: Vec<f64> = points
        .iter()
        .map(|point| point.value)
        .filter(|value| value.is_finite())
        .collect();
    if values.is_empty() {
        debug!(points = points.len(), "bar chart skipped: no numeric data");
        return None;
    }

    let mut canvas = Canvas::new(options.width, options.height, Color::WHITE);
    let area = PlotArea::for_canvas(options.width, options.height);
    let axis_max = axis_maximum(&values, options);
    draw_value_grid(&mut canvas, &area, axis_max, options, palette);

    let slot = area.width() / points.len() as f64;
    let bar_width = (slot * BAR_FILL_RATIO).clamp(4.0, BAR_MAX_WIDTH);
    let fill = palette.primary;
    let stroke = palette.primary.darken(0.3);

    for (index, point) in points.iter().enumerate() {
        if !point.value.is_finite() {
            continue;
        }

        let center = area.slot_center(index, points.len());
        let left = (center - bar_width / 2.0).round() as i64;
        let right = (center + bar_width / 2.0).round() as i64;
        let top = area.y_for(point.value.max(0.0), axis_max).round() as i64;

        if top < area.bottom {
            canvas.fill_rect(left, top, right, area.bottom, fill);
            canvas.fill_rect(left, top, right, top + 3, palette.primary.lighten(0.35));
            canvas.stroke_rect(left, top, right, area.bottom, 1, stroke);
        }

        canvas.draw_text_aligned(
            center.round() as i64,
            top - 8,
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
        bars = points.len(),
        width = image.width,
        height = image.height,
        bytes = image.bytes.len(),
        "bar chart rendered"
    );
    Some(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_renders_nothing() {
        assert!(render_bar(&[], &Palette::default(), &ChartOptions::default()).is_none());
    }

    #[test]
    fn non_numeric_series_renders_nothing() {
        let points = vec![ChartPoint::new("Broken", f64::NAN, 1)];
        assert!(render_bar(&points, &Palette::default(), &ChartOptions::default()).is_none());
    }

    #[test]
    fn renders_at_configured_size() {
        let points = vec![
            ChartPoint::new("Engineering", 82.5, 4),
            ChartPoint::new("Sales", 64.0, 3),
            ChartPoint::new("Support", 0.0, 1),
        ];
        let options = ChartOptions {
            width: 600,
            height: 320,
            ..ChartOptions::bar()
        };
        let image = render_bar(&points, &Palette::default(), &options).expect("chart renders");
        assert_eq!((image.width, image.height), (600, 320));
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
    }
}
