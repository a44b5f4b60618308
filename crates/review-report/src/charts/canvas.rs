use super::font::{fold_text, glyph, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::palette::Color;
use super::RasterImage;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// In-memory RGB raster with the drawing primitives the charts need.
///
/// Coordinates are signed; anything outside the canvas is clipped.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width.max(1), height.max(1), background.to_pixel()),
        }
    }

    pub(crate) fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        Some(Color::rgb(r, g, b))
    }

    pub fn put_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color.to_pixel());
    }

    /// Alpha-blends `color` over the existing pixel.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let Rgb([r, g, b]) = *self.image.get_pixel(x as u32, y as u32);
        let mix = |under: u8, over: u8| (under as f64 * (1.0 - alpha) + over as f64 * alpha).round() as u8;
        self.image.put_pixel(
            x as u32,
            y as u32,
            Rgb([mix(r, color.r), mix(g, color.g), mix(b, color.b)]),
        );
    }

    /// Fills the inclusive rectangle spanned by the two corners.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let left = left.max(0);
        let top = top.max(0);
        let right = right.min(self.width() as i64 - 1);
        let bottom = bottom.min(self.height() as i64 - 1);

        for y in top..=bottom {
            for x in left..=right {
                self.image.put_pixel(x as u32, y as u32, color.to_pixel());
            }
        }
    }

    pub fn stroke_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, thickness: u32, color: Color) {
        self.draw_line(x0, y0, x1, y0, thickness, color);
        self.draw_line(x1, y0, x1, y1, thickness, color);
        self.draw_line(x1, y1, x0, y1, thickness, color);
        self.draw_line(x0, y1, x0, y0, thickness, color);
    }

    /// Bresenham line stamped with a square brush of `thickness` pixels.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, thickness: u32, color: Color) {
        let thickness = thickness.max(1) as i64;
        let offset = (thickness - 1) / 2;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let step_x = if x0 < x1 { 1 } else { -1 };
        let step_y = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            if thickness == 1 {
                self.put_pixel(x, y, color);
            } else {
                self.fill_rect(
                    x - offset,
                    y - offset,
                    x - offset + thickness - 1,
                    y - offset + thickness - 1,
                    color,
                );
            }

            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    pub fn draw_polyline(&mut self, points: &[(f64, f64)], closed: bool, thickness: u32, color: Color) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            self.draw_line(
                a.0.round() as i64,
                a.1.round() as i64,
                b.0.round() as i64,
                b.1.round() as i64,
                thickness,
                color,
            );
        }
        if closed && points.len() > 2 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                self.draw_line(
                    last.0.round() as i64,
                    last.1.round() as i64,
                    first.0.round() as i64,
                    first.1.round() as i64,
                    thickness,
                    color,
                );
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Color) {
        let radius = radius.max(0);
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.put_pixel(cx + x, cy + y, color);
                }
            }
        }
    }

    /// Scanline even-odd polygon fill sampled at pixel centres.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color, alpha: f64) {
        if points.len() < 3 {
            return;
        }

        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let top = (min_y.floor() as i64).max(0);
        let bottom = (max_y.ceil() as i64).min(self.height() as i64 - 1);

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for y in top..=bottom {
            let sample = y as f64 + 0.5;
            crossings.clear();

            for index in 0..points.len() {
                let (ax, ay) = points[index];
                let (bx, by) = points[(index + 1) % points.len()];
                if (ay <= sample && by > sample) || (by <= sample && ay > sample) {
                    crossings.push(ax + (sample - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil() as i64;
                let end = (span[1] - 0.5).floor() as i64;
                for x in start..=end {
                    if alpha >= 1.0 {
                        self.put_pixel(x, y, color);
                    } else {
                        self.blend_pixel(x, y, color, alpha);
                    }
                }
            }
        }
    }

    /// Rendered width of `text` at the given integer scale.
    pub fn text_width(text: &str, scale: u32) -> i64 {
        let count = fold_text(text).chars().count() as i64;
        if count == 0 {
            return 0;
        }
        (count * GLYPH_ADVANCE as i64 - 1) * scale.max(1) as i64
    }

    pub fn text_height(scale: u32) -> i64 {
        GLYPH_HEIGHT as i64 * scale.max(1) as i64
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Color) {
        let scale = scale.max(1) as i64;
        let mut pen_x = x;
        for c in fold_text(text).chars() {
            let rows = glyph(c);
            for (row_index, row) in rows.iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if row & (0x10 >> column) == 0 {
                        continue;
                    }
                    let px = pen_x + column as i64 * scale;
                    let py = y + row_index as i64 * scale;
                    self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
                }
            }
            pen_x += GLYPH_ADVANCE as i64 * scale;
        }
    }

    /// Draws `text` positioned relative to the anchor point.
    pub fn draw_text_aligned(
        &mut self,
        x: i64,
        y: i64,
        text: &str,
        scale: u32,
        color: Color,
        h_align: HAlign,
        v_align: VAlign,
    ) {
        let width = Self::text_width(text, scale);
        let height = Self::text_height(scale);
        let left = match h_align {
            HAlign::Left => x,
            HAlign::Center => x - width / 2,
            HAlign::Right => x - width,
        };
        let top = match v_align {
            VAlign::Top => y,
            VAlign::Middle => y - height / 2,
            VAlign::Bottom => y - height,
        };
        self.draw_text(left, top, text, scale, color);
    }

    /// Encodes the canvas as a baseline JPEG. Returns `None` if the encoder
    /// fails, which callers treat as rendering being unavailable.
    pub fn encode_jpeg(self, quality: u8) -> Option<RasterImage> {
        let (width, height) = (self.width(), self.height());
        let mut bytes = Vec::new();
        let encoded = {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
            encoder.encode_image(&self.image)
        };
        if let Err(err) = encoded {
            warn!(%err, width, height, "raster encoding failed");
            return None;
        }

        Some(RasterImage {
            bytes,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_outside_bounds_is_clipped() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.put_pixel(-1, 4, Color::BLACK);
        canvas.fill_rect(-5, -5, 2, 2, Color::BLACK);
        canvas.draw_line(-20, 5, 40, 5, 3, Color::BLACK);
        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(canvas.pixel(9, 5), Some(Color::BLACK));
        assert_eq!(canvas.pixel(9, 9), Some(Color::WHITE));
        assert_eq!(canvas.pixel(10, 0), None);
    }

    #[test]
    fn lines_reach_both_endpoints() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE);
        canvas.draw_line(2, 3, 17, 11, 1, Color::BLACK);
        assert_eq!(canvas.pixel(2, 3), Some(Color::BLACK));
        assert_eq!(canvas.pixel(17, 11), Some(Color::BLACK));
    }

    #[test]
    fn polygon_fill_covers_interior_only() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE);
        canvas.fill_polygon(&[(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0)], Color::BLACK, 1.0);
        assert_eq!(canvas.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(canvas.pixel(1, 10), Some(Color::WHITE));
        assert_eq!(canvas.pixel(19, 19), Some(Color::WHITE));
    }

    #[test]
    fn blending_mixes_with_background() {
        let mut canvas = Canvas::new(2, 2, Color::WHITE);
        canvas.blend_pixel(0, 0, Color::BLACK, 0.5);
        assert_eq!(canvas.pixel(0, 0), Some(Color::rgb(128, 128, 128)));
    }

    #[test]
    fn text_metrics_scale_with_glyph_count() {
        assert_eq!(Canvas::text_width("", 2), 0);
        assert_eq!(Canvas::text_width("A", 1), 5);
        assert_eq!(Canvas::text_width("AB", 2), 22);
        assert_eq!(Canvas::text_height(3), 21);
    }

    #[test]
    fn text_draws_glyph_pixels() {
        let mut canvas = Canvas::new(20, 10, Color::WHITE);
        canvas.draw_text(0, 0, "T", 1, Color::BLACK);
        for x in 0..5 {
            assert_eq!(canvas.pixel(x, 0), Some(Color::BLACK));
        }
        assert_eq!(canvas.pixel(0, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(2, 6), Some(Color::BLACK));
    }

    #[test]
    fn encodes_jpeg_with_dimensions() {
        let canvas = Canvas::new(64, 32, Color::rgb(30, 60, 90));
        let image = canvas.encode_jpeg(90).expect("jpeg encodes");
        assert_eq!((image.width, image.height), (64, 32));
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&image.bytes[image.bytes.len() - 2..], &[0xFF, 0xD9]);
    }
}
