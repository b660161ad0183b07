//! Pairwise palette compatibility: distance, score, label and bridge colors.

use std::collections::HashSet;

use serde::Serialize;

use crate::color::{Lab, lab_midpoint, nearest};
use crate::error::{PaletteError, Result};
use crate::swatch::Swatch;

pub const MAX_BRIDGES: usize = 5;

const EXCELLENT_SCORE: u8 = 80;
const GOOD_SCORE: u8 = 60;

/// Result of comparing two palettes.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// 0 (far apart) to 100 (identical).
    pub score: u8,
    pub label: &'static str,
    pub description: &'static str,
    pub bridge_colors: Vec<Swatch>,
}

fn labs(palette: &[Swatch]) -> Vec<Lab> {
    palette.iter().map(Swatch::lab).collect()
}

/// Mean over `from` of the ΔE to the nearest color in `to`.
fn mean_nearest(from: &[Lab], to: &[Lab]) -> f64 {
    let total: f64 = from
        .iter()
        .filter_map(|&p| nearest(to, p).map(|(_, d)| d))
        .sum();
    total / from.len() as f64
}

/// Symmetric mean nearest-neighbor ΔE between two palettes.
pub fn palette_distance(a: &[Swatch], b: &[Swatch]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(PaletteError::EmptyPalette);
    }
    let (la, lb) = (labs(a), labs(b));
    Ok((mean_nearest(&la, &lb) + mean_nearest(&lb, &la)) / 2.0)
}

/// `100 - distance`, rounded and clamped to `0..=100`.
pub fn score_for(distance: f64) -> u8 {
    (100.0 - distance).round().clamp(0.0, 100.0) as u8
}

pub fn label_for(score: u8) -> &'static str {
    if score >= EXCELLENT_SCORE {
        "Excellent Match!"
    } else if score >= GOOD_SCORE {
        "Good Harmony"
    } else {
        "Decent Pairing"
    }
}

pub fn description_for(score: u8) -> &'static str {
    if score >= EXCELLENT_SCORE {
        "These palettes are naturally complementary."
    } else if score >= GOOD_SCORE {
        "These work well together; consider bridge colors."
    } else {
        "There's some tension: use bridge colors or adjust saturation/lightness."
    }
}

/// Lab midpoints between each of the first `min(|a|, |b|)` swatches of `a`
/// and its nearest swatch in `b`, deduplicated by hex and capped at
/// `MAX_BRIDGES`.
pub fn bridge_colors(a: &[Swatch], b: &[Swatch]) -> Vec<Swatch> {
    let (la, lb) = (labs(a), labs(b));
    let mut seen = HashSet::new();
    let mut bridges = Vec::new();

    for i in 0..la.len().min(lb.len()) {
        let p = la[i % la.len()];
        let Some((j, _)) = nearest(&lb, p) else { break };
        let bridge = Swatch::from_lab(lab_midpoint(p, lb[j]));
        if seen.insert(bridge.hex().to_string()) {
            bridges.push(bridge);
            if bridges.len() == MAX_BRIDGES {
                break;
            }
        }
    }

    bridges
}

/// Compare two non-empty palettes.
pub fn analyze(a: &[Swatch], b: &[Swatch]) -> Result<Analysis> {
    let distance = palette_distance(a, b)?;
    let score = score_for(distance);
    log::debug!("palette distance {distance:.2} -> score {score}");

    Ok(Analysis {
        score,
        label: label_for(score),
        description: description_for(score),
        bridge_colors: bridge_colors(a, b),
    })
}
