use super::canvas::{Canvas, HAlign, VAlign};
use super::font::GLYPH_ADVANCE;
use super::palette::{Color, Palette};
use super::{format_value, wrap_label, ChartOptions};

pub(crate) const LABEL_SCALE: u32 = 2;
pub(crate) const CATEGORY_LINES: usize = 2;

/// Pixel rectangle of the plotting region of a cartesian chart.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlotArea {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PlotArea {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let (width, height) = (width as i64, height as i64);
        Self {
            left: 96.min(width / 4),
            top: 48.min(height / 8),
            right: width - 32.min(width / 10),
            bottom: height - 128.min(height / 3),
        }
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).max(1) as f64
    }

    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(1) as f64
    }

    /// Vertical pixel position of `value` on an axis from 0 to `axis_max`.
    pub fn y_for(&self, value: f64, axis_max: f64) -> f64 {
        let ratio = if axis_max > 0.0 {
            (value / axis_max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.bottom as f64 - ratio * self.height()
    }

    /// Centre of the `index`-th of `count` equal category slots.
    pub fn slot_center(&self, index: usize, count: usize) -> f64 {
        let slot = self.width() / count.max(1) as f64;
        self.left as f64 + slot * (index as f64 + 0.5)
    }
}

/// Horizontal grid lines with tick labels plus the value and category axes.
pub(crate) fn draw_value_grid(
    canvas: &mut Canvas,
    area: &PlotArea,
    axis_max: f64,
    options: &ChartOptions,
    palette: &Palette,
) {
    let steps = options.steps();
    let tick_options = ChartOptions {
        decimals: if axis_max / steps as f64 >= 1.0 { 0 } else { options.decimals },
        ..options.clone()
    };

    for step in 0..=steps {
        let value = axis_max * step as f64 / steps as f64;
        let y = area.y_for(value, axis_max).round() as i64;
        if step > 0 {
            canvas.draw_line(area.left, y, area.right, y, 1, Color::GRID);
        }
        canvas.draw_text_aligned(
            area.left - 12,
            y,
            &format_value(value, &tick_options),
            LABEL_SCALE,
            Color::MUTED,
            HAlign::Right,
            VAlign::Middle,
        );
    }

    let axis = palette.dark;
    canvas.draw_line(area.left, area.top, area.left, area.bottom, 2, axis);
    canvas.draw_line(area.left, area.bottom, area.right, area.bottom, 2, axis);
}

/// Category labels centred under each slot, wrapped to at most two lines.
pub(crate) fn draw_category_labels<'a>(
    canvas: &mut Canvas,
    area: &PlotArea,
    labels: impl ExactSizeIterator<Item = &'a str>,
) {
    let count = labels.len();
    let slot = area.width() / count.max(1) as f64;
    let scale = if slot >= 96.0 { LABEL_SCALE } else { 1 };
    let max_chars = ((slot - 8.0) / (GLYPH_ADVANCE * scale) as f64).floor().max(1.0) as usize;
    let line_height = Canvas::text_height(scale) + 6;

    for (index, label) in labels.enumerate() {
        let x = area.slot_center(index, count).round() as i64;
        let mut y = area.bottom + 14;
        for line in wrap_label(label, max_chars, CATEGORY_LINES) {
            canvas.draw_text_aligned(x, y, &line, scale, Color::TEXT, HAlign::Center, VAlign::Top);
            y += line_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_maps_values_bottom_up() {
        let area = PlotArea::for_canvas(1200, 640);
        assert_eq!(area.y_for(0.0, 100.0), area.bottom as f64);
        assert_eq!(area.y_for(100.0, 100.0), area.top as f64);
        assert_eq!(area.y_for(250.0, 100.0), area.top as f64);
    }

    #[test]
    fn slots_divide_width_evenly() {
        let area = PlotArea::for_canvas(1200, 640);
        let first = area.slot_center(0, 4);
        let second = area.slot_center(1, 4);
        assert!((second - first - area.width() / 4.0).abs() < 1e-9);
    }
}
