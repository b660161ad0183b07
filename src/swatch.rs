use std::fmt;

use palette::Srgb;
use serde::Serialize;

use crate::color::{Lab, TextColor, contrast_text_color, lab_to_rgb, rgb_to_lab};
use crate::error::{PaletteError, Result};

/// One palette entry: an sRGB color and its canonical `#RRGGBB` form.
///
/// The hex string is derived from the RGB value on construction and the
/// fields are private, so the two never disagree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Swatch {
    hex: String,
    rgb: [u8; 3],
}

/// Uppercase `#RRGGBB` for an sRGB color.
pub fn hex_of(rgb: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

impl Swatch {
    pub fn new(rgb: Srgb<u8>) -> Self {
        Self {
            hex: hex_of(rgb),
            rgb: [rgb.red, rgb.green, rgb.blue],
        }
    }

    pub fn from_lab(lab: Lab) -> Self {
        Self::new(lab_to_rgb(lab))
    }

    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || PaletteError::InvalidHex(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| invalid())?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| invalid())?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| invalid())?;
        Ok(Self::new(Srgb::new(r, g, b)))
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    pub fn srgb(&self) -> Srgb<u8> {
        Srgb::new(self.rgb[0], self.rgb[1], self.rgb[2])
    }

    pub fn lab(&self) -> Lab {
        rgb_to_lab(self.srgb())
    }

    /// Human-readable `RGB(r, g, b)` label.
    pub fn rgb_label(&self) -> String {
        format!("RGB({}, {}, {})", self.rgb[0], self.rgb[1], self.rgb[2])
    }

    pub fn text_color(&self) -> TextColor {
        contrast_text_color(self.srgb())
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Parse a list of hex strings into swatches, failing on the first bad entry.
pub fn parse_hex_palette<S: AsRef<str>>(values: &[S]) -> Result<Vec<Swatch>> {
    values.iter().map(|s| Swatch::from_hex(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical_hex(s: &str) -> bool {
        s.len() == 7
            && s.starts_with('#')
            && s[1..].chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    #[test]
    fn hex_is_uppercase_and_padded() {
        let s = Swatch::new(Srgb::new(10, 171, 255));
        assert_eq!(s.hex(), "#0AABFF");
        assert!(is_canonical_hex(s.hex()));
        assert_eq!(s.to_string(), "#0AABFF");
        assert_eq!(s.rgb_label(), "RGB(10, 171, 255)");
    }

    #[test]
    fn parses_with_and_without_hash() {
        let a = Swatch::from_hex("#ff8000").unwrap();
        let b = Swatch::from_hex("FF8000").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rgb(), [255, 128, 0]);
        assert_eq!(a.hex(), "#FF8000");
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["#FF", "#GGGGGG", "1234567", "#ÄÄÄ", ""] {
            assert!(
                matches!(Swatch::from_hex(bad), Err(PaletteError::InvalidHex(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_palette_stops_on_error() {
        let ok = parse_hex_palette(&["#000000", "#FFFFFF"]).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(parse_hex_palette(&["#000000", "nope"]).is_err());
    }

    #[test]
    fn serializes_hex_and_rgb_array() {
        let s = Swatch::new(Srgb::new(255, 0, 0));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({ "hex": "#FF0000", "rgb": [255, 0, 0] }));
    }
}
