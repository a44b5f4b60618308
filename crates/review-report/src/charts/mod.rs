//! Raster charts drawn from pixel primitives and encoded as JPEG.
//!
//! Every renderer returns `None` when there is nothing numeric to plot or the
//! raster backend fails; callers substitute a textual fallback.

mod axes;
mod bar;
pub mod canvas;
pub mod font;
mod line;
pub mod logo;
pub mod palette;
mod radar;

pub use bar::render_bar;
pub use line::render_line;
pub use logo::{decode_logo, placeholder_logo};
pub use palette::{resolve_palette, Color, Palette, SiteBranding};
pub use radar::{label_anchor, radar_vertices, render_radar, RADAR_MIN_AXES};

use crate::report::truncate_label;

/// Encoded raster image plus the pixel size needed for page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Styling knobs shared by all chart types.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Fixed axis maximum; derived from the data when `None`.
    pub max_value: Option<f64>,
    pub value_suffix: String,
    pub decimals: usize,
    pub grid_steps: u32,
    /// Values are percentages, so the axis always reaches at least 100.
    pub percentage: bool,
    pub quality: u8,
}

impl ChartOptions {
    pub fn bar() -> Self {
        Self {
            width: 1200,
            height: 640,
            max_value: None,
            value_suffix: "%".to_string(),
            decimals: 1,
            grid_steps: 5,
            percentage: true,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn radar() -> Self {
        Self {
            width: 900,
            height: 900,
            ..Self::bar()
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub(crate) fn steps(&self) -> u32 {
        self.grid_steps.clamp(1, 10)
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::bar()
    }
}

/// Axis maximum: the data maximum rounded up to the next multiple of ten,
/// at least 100 for percentages, or the configured override.
pub fn axis_maximum(values: &[f64], options: &ChartOptions) -> f64 {
    if let Some(max) = options.max_value.filter(|max| max.is_finite() && *max > 0.0) {
        return max;
    }

    let data_max = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    let mut rounded = (data_max / 10.0).ceil() * 10.0;
    if rounded <= 0.0 {
        rounded = 10.0;
    }

    if options.percentage {
        rounded.max(100.0)
    } else {
        rounded
    }
}

pub fn format_value(value: f64, options: &ChartOptions) -> String {
    format!("{:.*}{}", options.decimals, value, options.value_suffix)
}

/// Word-wraps a category label to `max_lines` lines of `max_chars`,
/// truncating the last line with an ellipsis when text remains.
pub fn wrap_label(label: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut words = label.split_whitespace().peekable();

    while let Some(word) = words.next() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if lines.len() == max_lines - 1 {
            let rest: Vec<&str> = std::iter::once(word).chain(words.by_ref()).collect();
            lines.push(truncate_label(&rest.join(" "), max_chars));
            return lines;
        }

        if word.chars().count() > max_chars {
            lines.push(truncate_label(word, max_chars));
            if lines.len() == max_lines && words.peek().is_some() {
                return lines;
            }
        } else {
            current.push_str(word);
        }

        if lines.len() == max_lines {
            return lines;
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}
