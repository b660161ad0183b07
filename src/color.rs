//! Color-space conversions between 8-bit sRGB and CIE L*a*b* (D65).
//!
//! The forward and inverse transforms use fixed matrix and threshold
//! constants so that `lab_to_rgb(rgb_to_lab(c)) == c` holds for every 8-bit
//! sRGB color. Distances are ΔE*ab (CIE76), i.e. Euclidean in Lab.

use palette::white_point::D65;
use palette::{FromColor, Hsv, Srgb};

/// CIE L*a*b* relative to the D65 white point.
pub type Lab = palette::Lab<D65, f64>;

const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

const EPSILON: f64 = 0.008856;
const KAPPA_SLOPE: f64 = 7.787;
const F_OFFSET: f64 = 16.0 / 116.0;

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

// Exact inverse of RGB_TO_XYZ.
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [3.2406254773200533, -1.5372079722103187, -0.49862859869824788],
    [-0.96893071472931935, 1.875756060885241, 0.041517523842953943],
    [0.055710120445510609, -0.20402105059848669, 1.0569959422543882],
];

/// Relative luminance above which black text reads better than white.
const TEXT_LUMINANCE_THRESHOLD: f64 = 0.179;

#[inline]
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA_SLOPE * t + F_OFFSET
    }
}

#[inline]
fn lab_f_inv(t: f64) -> f64 {
    let t3 = t * t * t;
    if t3 > EPSILON {
        t3
    } else {
        (t - F_OFFSET) / KAPPA_SLOPE
    }
}

#[inline]
fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Round a 0..=255 float channel to a byte, clamping out-of-range values.
#[inline]
pub(crate) fn clamp8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert an 8-bit sRGB color to Lab.
pub fn rgb_to_lab(rgb: Srgb<u8>) -> Lab {
    let linear = [
        srgb_to_linear(rgb.red as f64 / 255.0),
        srgb_to_linear(rgb.green as f64 / 255.0),
        srgb_to_linear(rgb.blue as f64 / 255.0),
    ];
    let [x, y, z] = mul(&RGB_TO_XYZ, linear);

    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y / WHITE_Y);
    let fz = lab_f(z / WHITE_Z);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert Lab back to 8-bit sRGB.
///
/// Out-of-gamut colors are clipped per channel in linear space before
/// gamma encoding.
pub fn lab_to_rgb(lab: Lab) -> Srgb<u8> {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let xyz = [
        WHITE_X * lab_f_inv(fx),
        WHITE_Y * lab_f_inv(fy),
        WHITE_Z * lab_f_inv(fz),
    ];
    let [r, g, b] = mul(&XYZ_TO_RGB, xyz);

    let encode = |c: f64| clamp8(linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0);
    Srgb::new(encode(r), encode(g), encode(b))
}

/// ΔE*ab (CIE76) between two Lab colors.
#[inline]
pub fn delta_e(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Index and distance of the candidate closest to `p`. Ties resolve to the
/// lowest index.
pub fn nearest(candidates: &[Lab], p: Lab) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &c) in candidates.iter().enumerate() {
        let d = delta_e(p, c);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Component-wise midpoint of two Lab colors.
pub fn lab_midpoint(a: Lab, b: Lab) -> Lab {
    Lab::new((a.l + b.l) / 2.0, (a.a + b.a) / 2.0, (a.b + b.b) / 2.0)
}

/// Text color that stays legible on top of a background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn hex(self) -> &'static str {
        match self {
            TextColor::Black => "#000000",
            TextColor::White => "#FFFFFF",
        }
    }
}

/// Pick black or white text for the given background using its WCAG
/// relative luminance.
pub fn contrast_text_color(rgb: Srgb<u8>) -> TextColor {
    let lin = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    let luminance = 0.2126 * lin(rgb.red) + 0.7152 * lin(rgb.green) + 0.0722 * lin(rgb.blue);

    if luminance > TEXT_LUMINANCE_THRESHOLD {
        TextColor::Black
    } else {
        TextColor::White
    }
}

/// HSV triple used for palette ordering: hue in whole degrees `[0, 360)`,
/// saturation and value in `[0, 1]`.
pub fn rgb_to_hsv(rgb: Srgb<u8>) -> (f64, f64, f64) {
    let hsv = Hsv::<palette::encoding::Srgb, f64>::from_color(rgb.into_format::<f64>());
    let hue = hsv.hue.into_positive_degrees().round() % 360.0;
    (hue, hsv.saturation, hsv.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Srgb<u8> {
        Srgb::new(r, g, b)
    }

    #[test]
    fn white_and_black_hit_lightness_extremes() {
        let white = rgb_to_lab(rgb(255, 255, 255));
        assert!((white.l - 100.0).abs() < 0.01);
        assert!(white.a.abs() < 0.05 && white.b.abs() < 0.05);

        let black = rgb_to_lab(rgb(0, 0, 0));
        assert!(black.l.abs() < 1e-9);
    }

    #[test]
    fn pure_red_matches_reference_lab() {
        let red = rgb_to_lab(rgb(255, 0, 0));
        assert!((red.l - 53.24).abs() < 0.1, "L = {}", red.l);
        assert!((red.a - 80.09).abs() < 0.2, "a = {}", red.a);
        assert!((red.b - 67.20).abs() < 0.2, "b = {}", red.b);
    }

    #[test]
    fn round_trip_every_rgb_value() {
        for r in 0..=255u8 {
            for g in 0..=255u8 {
                for b in 0..=255u8 {
                    let c = rgb(r, g, b);
                    let back = lab_to_rgb(rgb_to_lab(c));
                    assert_eq!(back, c, "round trip failed for {:?}", c);
                }
            }
        }
    }

    #[test]
    fn out_of_gamut_lab_is_clipped() {
        assert_eq!(lab_to_rgb(Lab::new(150.0, 0.0, 0.0)), rgb(255, 255, 255));
        assert_eq!(lab_to_rgb(Lab::new(-20.0, 0.0, 0.0)), rgb(0, 0, 0));
    }

    #[test]
    fn delta_e_is_symmetric_and_zero_on_identity() {
        let a = Lab::new(50.0, 10.0, -20.0);
        let b = Lab::new(60.0, -5.0, 7.5);
        assert_eq!(delta_e(a, b), delta_e(b, a));
        assert_eq!(delta_e(a, a), 0.0);
        assert!((delta_e(Lab::new(0.0, 0.0, 0.0), Lab::new(3.0, 4.0, 0.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn nearest_prefers_first_on_ties() {
        let candidates = [
            Lab::new(40.0, 0.0, 0.0),
            Lab::new(60.0, 0.0, 0.0),
            Lab::new(90.0, 0.0, 0.0),
        ];
        assert_eq!(nearest(&candidates, Lab::new(50.0, 0.0, 0.0)), Some((0, 10.0)));
        assert_eq!(nearest(&candidates, Lab::new(88.0, 0.0, 0.0)).map(|(i, _)| i), Some(2));
        assert_eq!(nearest(&[], Lab::new(0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn text_color_flips_on_luminance() {
        assert_eq!(contrast_text_color(rgb(255, 255, 255)), TextColor::Black);
        assert_eq!(contrast_text_color(rgb(255, 255, 0)), TextColor::Black);
        assert_eq!(contrast_text_color(rgb(0, 0, 0)), TextColor::White);
        assert_eq!(contrast_text_color(rgb(0, 0, 255)), TextColor::White);
        assert_eq!(TextColor::White.hex(), "#FFFFFF");
    }

    #[test]
    fn hsv_of_primaries() {
        let (h, s, v) = rgb_to_hsv(rgb(255, 0, 0));
        assert_eq!(h, 0.0);
        assert!((s - 1.0).abs() < 1e-12 && (v - 1.0).abs() < 1e-12);

        let (h, s, v) = rgb_to_hsv(rgb(0, 0, 255));
        assert_eq!(h, 240.0);
        assert!((s - 1.0).abs() < 1e-12 && (v - 1.0).abs() < 1e-12);

        let (h, s, v) = rgb_to_hsv(rgb(128, 128, 128));
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((v - 128.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn hsv_hue_wraps_below_360() {
        // hue just under 360 rounds up and wraps to 0
        let (h, _, _) = rgb_to_hsv(rgb(255, 0, 1));
        assert!(h < 360.0);
    }
}
