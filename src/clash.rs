//! Counter-palettes: colors chosen to clash with, or blend into, a source
//! palette. Both generators map swatches one-to-one and keep the order.
//!
//! The retry bounds and step sizes are tuned by eye rather than derived, and
//! changing any of them changes visible output.

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::color::{Lab, clamp8, delta_e, lab_to_rgb};
use crate::swatch::Swatch;

/// Minimum ΔE between a swatch and its complementary counterpart.
const MIN_CLASH_DELTA_E: f64 = 35.0;
const CLASH_LIGHTNESS_STEP: f64 = 6.0;
const CLASH_CHROMA_SCALE: f64 = 1.2;
const MAX_CLASH_ATTEMPTS: usize = 8;

/// (lightness nudge, chroma scale) for the first and the retry attempt.
const LOW_CONTRAST_STEPS: [(f64, f64); 2] = [(3.0, 0.88), (8.0, 0.8)];
const RGB_NUDGE: f64 = 12.0;

/// Which counter-palette to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AntiMode {
    /// Lab antipodes pushed until they are clearly distinct.
    #[default]
    Complement,
    /// Barely distinguishable neighbors, the kind that ruin UI contrast.
    LowContrast,
}

impl AntiMode {
    pub fn apply(self, palette: &[Swatch]) -> Vec<Swatch> {
        match self {
            AntiMode::Complement => complementary_clash(palette),
            AntiMode::LowContrast => low_contrast_clash(palette),
        }
    }
}

impl std::str::FromStr for AntiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "complement" | "complementary" => Ok(AntiMode::Complement),
            "low-contrast" | "lowcontrast" => Ok(AntiMode::LowContrast),
            other => Err(format!("unknown anti-palette mode {other:?}")),
        }
    }
}

/// One swatch per input, each the Lab antipode `(100 - L, -a, -b)` of its
/// source. Antipodes closer than `MIN_CLASH_DELTA_E` (near-gray sources) get
/// their lightness pushed away from 50 and their chroma amplified.
pub fn complementary_clash(palette: &[Swatch]) -> Vec<Swatch> {
    palette
        .iter()
        .map(|swatch| {
            let source = swatch.lab();
            let mut comp = Lab::new(100.0 - source.l, -source.a, -source.b);

            let mut attempts = 0;
            while delta_e(source, comp) < MIN_CLASH_DELTA_E && attempts < MAX_CLASH_ATTEMPTS {
                let step = if comp.l > 50.0 {
                    CLASH_LIGHTNESS_STEP
                } else {
                    -CLASH_LIGHTNESS_STEP
                };
                comp = Lab::new(
                    (comp.l + step).clamp(0.0, 100.0),
                    comp.a * CLASH_CHROMA_SCALE,
                    comp.b * CLASH_CHROMA_SCALE,
                );
                attempts += 1;
            }

            Swatch::from_lab(comp)
        })
        .collect()
}

/// One swatch per input, each a slightly desaturated neighbor with lightness
/// nudged toward the middle. Never returns the source color itself.
pub fn low_contrast_clash(palette: &[Swatch]) -> Vec<Swatch> {
    palette.iter().map(low_contrast_twin).collect()
}

fn low_contrast_twin(swatch: &Swatch) -> Swatch {
    let source = swatch.srgb();
    (0..LOW_CONTRAST_STEPS.len())
        .map(|attempt| low_contrast_candidate(swatch.lab(), attempt))
        .find(|&rgb| rgb != source)
        .map(Swatch::new)
        // Lab nudges rounded back onto the source; step away in RGB instead.
        .unwrap_or_else(|| Swatch::new(rgb_nudge(source)))
}

/// Lightness moved toward the middle and chroma scaled, per the given
/// attempt's entry in `LOW_CONTRAST_STEPS`.
fn low_contrast_candidate(lab: Lab, attempt: usize) -> Srgb<u8> {
    let (nudge, scale) = LOW_CONTRAST_STEPS[attempt];
    let toward_middle = if lab.l > 50.0 { -1.0 } else { 1.0 };
    lab_to_rgb(Lab::new(
        (lab.l + toward_middle * nudge).clamp(0.0, 100.0),
        lab.a * scale,
        lab.b * scale,
    ))
}

/// Each channel stepped by `RGB_NUDGE` toward the opposite end of its range.
fn rgb_nudge(rgb: Srgb<u8>) -> Srgb<u8> {
    let nudge = |c: u8| {
        let c = c as f64;
        clamp8(if c > 127.0 { c - RGB_NUDGE } else { c + RGB_NUDGE })
    };
    Srgb::new(nudge(rgb.red), nudge(rgb.green), nudge(rgb.blue))
}
