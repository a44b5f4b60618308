use super::canvas::{Canvas, HAlign, VAlign};
use super::palette::{Color, Palette};
use super::RasterImage;
use image::{Rgb, RgbImage};
use tracing::{debug, warn};

pub const PLACEHOLDER_WIDTH: u32 = 240;
pub const PLACEHOLDER_HEIGHT: u32 = 120;
const INITIALS_SCALE: u32 = 7;

/// Decodes an uploaded logo in any supported raster format and re-encodes it
/// as an RGB JPEG for embedding. Transparent areas are flattened onto white.
pub fn decode_logo(bytes: &[u8], quality: u8) -> Option<RasterImage> {
    if bytes.is_empty() {
        return None;
    }

    let decoded = match image::load_from_memory(bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(%err, bytes = bytes.len(), "logo could not be decoded");
            return None;
        }
    };

    let rgba = decoded.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as f64 / 255.0;
        let over = |channel: u8| (channel as f64 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        Rgb([over(r), over(g), over(b)])
    });

    let image = Canvas::from_image(flattened).encode_jpeg(quality)?;
    debug!(width = image.width, height = image.height, "logo decoded");
    Some(image)
}

/// Up to two uppercase initials from the site name, `?` when it has none.
pub fn site_initials(site_name: &str) -> String {
    let initials: String = site_name
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

/// Generated stand-in logo: site initials on the primary brand colour.
pub fn placeholder_logo(site_name: &str, palette: &Palette, quality: u8) -> Option<RasterImage> {
    let mut canvas = Canvas::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, palette.primary);
    let right = PLACEHOLDER_WIDTH as i64 - 1;
    let bottom = PLACEHOLDER_HEIGHT as i64 - 1;
    canvas.fill_rect(0, bottom - 7, right, bottom, palette.dark);
    canvas.draw_text_aligned(
        right / 2,
        (bottom - 7) / 2,
        &site_initials(site_name),
        INITIALS_SCALE,
        Color::WHITE,
        HAlign::Center,
        VAlign::Middle,
    );
    canvas.encode_jpeg(quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn initials_come_from_leading_words() {
        assert_eq!(site_initials("Acme Review Portal"), "AR");
        assert_eq!(site_initials("northwind"), "N");
        assert_eq!(site_initials("  "), "?");
        assert_eq!(site_initials("blue-sky labs"), "BS");
    }

    #[test]
    fn png_logo_is_reencoded_as_jpeg() {
        let mut source = RgbaImage::from_pixel(40, 20, Rgba([200, 20, 20, 255]));
        source.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut png = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("png encodes");

        let logo = decode_logo(&png, 90).expect("logo decodes");
        assert_eq!((logo.width, logo.height), (40, 20));
        assert_eq!(&logo.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn vector_logo_is_rejected() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        assert!(decode_logo(svg, 90).is_none());
        assert!(decode_logo(&[], 90).is_none());
    }

    #[test]
    fn placeholder_has_fixed_size() {
        let logo = placeholder_logo("Acme", &Palette::default(), 90).expect("placeholder renders");
        assert_eq!((logo.width, logo.height), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
    }
}
