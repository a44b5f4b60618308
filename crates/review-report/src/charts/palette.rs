use serde::{Deserialize, Serialize};

/// 8-bit RGB colour shared by the raster charts and the document layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TEXT: Color = Color::rgb(51, 51, 51);
    pub const MUTED: Color = Color::rgb(110, 110, 110);
    pub const GRID: Color = Color::rgb(225, 228, 232);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|c| {
                    c.to_digit(16).map(|value| (value * 17) as u8)
                });
                Some(Self::rgb(channels.next()??, channels.next()??, channels.next()??))
            }
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Moves each channel `amount` (0..=1) of the way toward white.
    pub fn lighten(self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let channel = |value: u8| (value as f64 + (255.0 - value as f64) * amount).round() as u8;
        Self::rgb(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Moves each channel `amount` (0..=1) of the way toward black.
    pub fn darken(self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let channel = |value: u8| (value as f64 * (1.0 - amount)).round() as u8;
        Self::rgb(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Channels scaled to 0..=1 for document colour operators.
    pub fn unit_components(self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

/// Brand colour triple consumed by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub light: Color,
    pub dark: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x1f, 0x4e, 0x79),
            light: Color::rgb(0xd6, 0xe4, 0xf0),
            dark: Color::rgb(0x0f, 0x2a, 0x44),
        }
    }
}

const DERIVED_LIGHT: f64 = 0.82;
const DERIVED_DARK: f64 = 0.45;

/// Site branding settings as stored by the portal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteBranding {
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub light_color: Option<String>,
    #[serde(default)]
    pub dark_color: Option<String>,
}

/// Resolves the chart palette from branding settings.
///
/// Without a usable primary colour the default triple is returned whole.
/// A missing light or dark colour is derived from the primary one.
pub fn resolve_palette(branding: &SiteBranding) -> Palette {
    let parse = |value: &Option<String>| value.as_deref().and_then(Color::from_hex);

    let Some(primary) = parse(&branding.primary_color) else {
        return Palette::default();
    };

    Palette {
        primary,
        light: parse(&branding.light_color).unwrap_or_else(|| primary.lighten(DERIVED_LIGHT)),
        dark: parse(&branding.dark_color).unwrap_or_else(|| primary.darken(DERIVED_DARK)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("1F4E79"), Some(Color::rgb(0x1f, 0x4e, 0x79)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::rgb(0x1f, 0x4e, 0x79).to_hex(), "#1f4e79");
    }

    #[test]
    fn brightness_moves_toward_white_and_black() {
        let base = Color::rgb(100, 150, 200);
        assert_eq!(base.lighten(1.0), Color::WHITE);
        assert_eq!(base.darken(1.0), Color::BLACK);
        assert_eq!(base.lighten(0.0), base);
        let lighter = base.lighten(0.5);
        assert!(lighter.r > base.r && lighter.b > base.b);
        let darker = base.darken(0.5);
        assert_eq!(darker, Color::rgb(50, 75, 100));
    }

    #[test]
    fn missing_branding_uses_default_triple() {
        assert_eq!(resolve_palette(&SiteBranding::default()), Palette::default());
        let invalid = SiteBranding {
            primary_color: Some("not a colour".to_string()),
            light_color: Some("#ffffff".to_string()),
            ..SiteBranding::default()
        };
        assert_eq!(resolve_palette(&invalid), Palette::default());
    }

    #[test]
    fn light_and_dark_derive_from_primary() {
        let branding = SiteBranding {
            primary_color: Some("#336699".to_string()),
            dark_color: Some("#001122".to_string()),
            ..SiteBranding::default()
        };
        let palette = resolve_palette(&branding);
        assert_eq!(palette.primary, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(palette.light, palette.primary.lighten(DERIVED_LIGHT));
        assert_eq!(palette.dark, Color::rgb(0x00, 0x11, 0x22));
    }
}
