//! k-means++ color quantization in Lab space.

use std::cmp::Ordering;
use std::collections::HashSet;

use palette::Srgb;
use rand::Rng;
use serde::Serialize;

use crate::color::{Lab, delta_e, nearest, rgb_to_hsv, rgb_to_lab};
use crate::swatch::Swatch;

/// Fixed number of assign/update rounds after seeding.
pub const REFINEMENT_ROUNDS: usize = 10;

/// Clustering needs at least `FALLBACK_FACTOR * k` samples, otherwise the
/// first-seen distinct colors are listed instead.
pub const FALLBACK_FACTOR: usize = 4;

/// How a palette was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    KMeans,
    /// Too few samples to cluster; distinct colors were listed as-is.
    DistinctColors,
}

/// Palette extracted from a set of samples.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub swatches: Vec<Swatch>,
    pub method: ExtractionMethod,
    pub sample_count: usize,
}

impl Extraction {
    /// True when clustering was skipped for lack of samples.
    pub fn is_degraded(&self) -> bool {
        self.method == ExtractionMethod::DistinctColors
    }
}

/// Build a palette of at most `k` swatches from RGB samples, choosing between
/// clustering and the distinct-color fallback. `k == 0` never clusters and
/// reports an empty distinct-color listing.
pub fn extract_from_samples<R: Rng + ?Sized>(
    samples: &[Srgb<u8>],
    k: usize,
    rng: &mut R,
) -> Extraction {
    let (swatches, method) = if k == 0 {
        (Vec::new(), ExtractionMethod::DistinctColors)
    } else if samples.len() < k.saturating_mul(FALLBACK_FACTOR) {
        log::info!(
            "only {} samples for k = {}, listing distinct colors instead of clustering",
            samples.len(),
            k
        );
        (distinct_colors(samples, k), ExtractionMethod::DistinctColors)
    } else {
        (quantize(samples, k, rng), ExtractionMethod::KMeans)
    };

    Extraction {
        swatches,
        method,
        sample_count: samples.len(),
    }
}

/// Cluster `samples` into at most `k` representative swatches.
///
/// Returns an empty palette when there are no samples or `k == 0`. The
/// result never holds more swatches than there are distinct input colors and
/// is ordered by hue, then saturation and value descending.
pub fn quantize<R: Rng + ?Sized>(samples: &[Srgb<u8>], k: usize, rng: &mut R) -> Vec<Swatch> {
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let distinct = samples
        .iter()
        .map(|c| [c.red, c.green, c.blue])
        .collect::<HashSet<_>>()
        .len();
    let k = k.min(distinct);

    let labs: Vec<Lab> = samples.iter().map(|&c| rgb_to_lab(c)).collect();
    let mut centers = seed_centers(&labs, k, rng);
    log::debug!("seeded {} centers from {} samples", centers.len(), labs.len());

    refine(&labs, &mut centers);

    let mut seen = HashSet::new();
    let mut swatches: Vec<Swatch> = centers
        .into_iter()
        .map(Swatch::from_lab)
        .filter(|s| seen.insert(s.hex().to_string()))
        .collect();
    order_palette(&mut swatches);
    swatches
}

/// k-means++ seeding: the first center is uniform, each next one is drawn
/// with probability proportional to its squared distance to the closest
/// chosen center. Stops early once every sample coincides with a center.
fn seed_centers<R: Rng + ?Sized>(labs: &[Lab], k: usize, rng: &mut R) -> Vec<Lab> {
    let mut centers = Vec::with_capacity(k);
    if k == 0 || labs.is_empty() {
        return centers;
    }

    let first = labs[rng.random_range(0..labs.len())];
    centers.push(first);
    let mut weights: Vec<f64> = labs.iter().map(|&p| squared(delta_e(p, first))).collect();

    while centers.len() < k {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            break;
        }

        let mut target = rng.random::<f64>() * total;
        let mut chosen = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            chosen = Some(i);
            target -= w;
            if target <= 0.0 {
                break;
            }
        }
        let Some(idx) = chosen else { break };

        let center = labs[idx];
        centers.push(center);
        for (w, &p) in weights.iter_mut().zip(labs) {
            *w = w.min(squared(delta_e(p, center)));
        }
    }

    centers
}

/// Lloyd refinement for a fixed number of rounds. Empty clusters keep their
/// previous center.
fn refine(labs: &[Lab], centers: &mut [Lab]) {
    for round in 0..REFINEMENT_ROUNDS {
        let mut sums = vec![[0.0f64; 3]; centers.len()];
        let mut counts = vec![0usize; centers.len()];

        for &p in labs {
            if let Some((i, _)) = nearest(centers, p) {
                sums[i][0] += p.l;
                sums[i][1] += p.a;
                sums[i][2] += p.b;
                counts[i] += 1;
            }
        }

        for (center, (sum, &count)) in centers.iter_mut().zip(sums.iter().zip(&counts)) {
            if count > 0 {
                let n = count as f64;
                *center = Lab::new(sum[0] / n, sum[1] / n, sum[2] / n);
            }
        }

        let empty = counts.iter().filter(|&&c| c == 0).count();
        if empty > 0 {
            log::debug!("round {round}: {empty} empty clusters kept in place");
        }
    }
}

/// List the first `k` distinct colors in sample order, then apply the
/// palette ordering.
pub fn distinct_colors(samples: &[Srgb<u8>], k: usize) -> Vec<Swatch> {
    let mut seen = HashSet::new();
    let mut swatches: Vec<Swatch> = samples
        .iter()
        .filter(|c| seen.insert([c.red, c.green, c.blue]))
        .take(k)
        .map(|&c| Swatch::new(c))
        .collect();
    order_palette(&mut swatches);
    swatches
}

/// Stable sort by hue ascending, then saturation and value descending.
pub fn order_palette(swatches: &mut [Swatch]) {
    swatches.sort_by(|a, b| {
        let (ha, sa, va) = rgb_to_hsv(a.srgb());
        let (hb, sb, vb) = rgb_to_hsv(b.srgb());
        ha.partial_cmp(&hb)
            .unwrap_or(Ordering::Equal)
            .then(sb.partial_cmp(&sa).unwrap_or(Ordering::Equal))
            .then(vb.partial_cmp(&va).unwrap_or(Ordering::Equal))
    });
}

#[inline]
fn squared(v: f64) -> f64 {
    v * v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rgb(r: u8, g: u8, b: u8) -> Srgb<u8> {
        Srgb::new(r, g, b)
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn red_blue(n: usize) -> Vec<Srgb<u8>> {
        (0..n)
            .map(|i| if i % 2 == 0 { rgb(255, 0, 0) } else { rgb(0, 0, 255) })
            .collect()
    }

    #[test]
    fn empty_input_or_zero_k_gives_empty_palette() {
        assert!(quantize(&[], 5, &mut rng(1)).is_empty());
        assert!(quantize(&[rgb(1, 2, 3)], 0, &mut rng(1)).is_empty());
    }

    #[test]
    fn splits_red_and_blue() {
        for seed in 0..8 {
            let palette = quantize(&red_blue(1000), 2, &mut rng(seed));
            let hexes: Vec<&str> = palette.iter().map(|s| s.hex()).collect();
            assert_eq!(hexes, vec!["#FF0000", "#0000FF"], "seed {seed}");
        }
    }

    #[test]
    fn never_exceeds_distinct_colors() {
        let samples = red_blue(100);
        let palette = quantize(&samples, 8, &mut rng(3));
        assert_eq!(palette.len(), 2);

        let single = vec![rgb(40, 90, 200); 50];
        let palette = quantize(&single, 5, &mut rng(3));
        assert_eq!(palette.len(), 1);
        assert_eq!(palette[0].hex(), "#285AC8");
    }

    #[test]
    fn size_bounds_hold_for_random_samples() {
        let mut source = rng(42);
        for k in 1..=10 {
            let samples: Vec<Srgb<u8>> = (0..200)
                .map(|_| rgb(source.random(), source.random(), source.random()))
                .collect();
            let palette = quantize(&samples, k, &mut rng(k as u64));
            assert!(!palette.is_empty());
            assert!(palette.len() <= k);

            let hexes: HashSet<&str> = palette.iter().map(|s| s.hex()).collect();
            assert_eq!(hexes.len(), palette.len(), "duplicate hex in palette");
        }
    }

    #[test]
    fn same_seed_same_palette() {
        let mut source = rng(7);
        let samples: Vec<Srgb<u8>> = (0..500)
            .map(|_| rgb(source.random(), source.random(), source.random()))
            .collect();
        let a = quantize(&samples, 6, &mut rng(99));
        let b = quantize(&samples, 6, &mut rng(99));
        assert_eq!(a, b);
    }

    #[test]
    fn seeding_picks_far_colors_first() {
        // three tight groups; k = 3 must land one center in each
        let mut samples = Vec::new();
        for i in 0..30u8 {
            samples.push(rgb(250 - i % 3, 10, 10));
            samples.push(rgb(10, 200 + i % 3, 10));
            samples.push(rgb(10, 10, 250 - i % 3));
        }
        for seed in 0..5 {
            let palette = quantize(&samples, 3, &mut rng(seed));
            assert_eq!(palette.len(), 3);
            let (r, g, b) = (palette[0].rgb(), palette[1].rgb(), palette[2].rgb());
            assert!(r[0] > 200, "{:?}", palette);
            assert!(g[1] > 150, "{:?}", palette);
            assert!(b[2] > 200, "{:?}", palette);
        }
    }

    #[test]
    fn orders_by_hue_then_saturation_then_value() {
        let mut swatches = vec![
            Swatch::new(rgb(0, 0, 255)),
            Swatch::new(rgb(128, 0, 0)),
            Swatch::new(rgb(255, 128, 128)),
            Swatch::new(rgb(255, 0, 0)),
            Swatch::new(rgb(0, 255, 0)),
        ];
        order_palette(&mut swatches);
        let hexes: Vec<&str> = swatches.iter().map(|s| s.hex()).collect();
        assert_eq!(hexes, vec!["#FF0000", "#800000", "#FF8080", "#00FF00", "#0000FF"]);
    }

    #[test]
    fn achromatic_colors_sort_by_value() {
        let mut swatches = vec![
            Swatch::new(rgb(90, 90, 90)),
            Swatch::new(rgb(200, 200, 200)),
        ];
        order_palette(&mut swatches);
        assert_eq!(swatches[0].hex(), "#C8C8C8");
        assert_eq!(swatches[1].hex(), "#5A5A5A");
    }

    #[test]
    fn falls_back_to_distinct_colors_when_sparse() {
        let samples = vec![rgb(0, 0, 255), rgb(255, 0, 0), rgb(0, 0, 255), rgb(0, 255, 0)];
        let extraction = extract_from_samples(&samples, 5, &mut rng(0));
        assert!(extraction.is_degraded());
        assert_eq!(extraction.sample_count, 4);
        let hexes: Vec<&str> = extraction.swatches.iter().map(|s| s.hex()).collect();
        assert_eq!(hexes, vec!["#FF0000", "#00FF00", "#0000FF"]);
    }

    #[test]
    fn zero_k_is_not_reported_as_clustered() {
        let extraction = extract_from_samples(&red_blue(40), 0, &mut rng(3));
        assert!(extraction.swatches.is_empty());
        assert_eq!(extraction.method, ExtractionMethod::DistinctColors);
        assert_eq!(extraction.sample_count, 40);
    }

    #[test]
    fn distinct_listing_caps_at_k() {
        let samples = vec![rgb(10, 20, 30), rgb(200, 20, 30), rgb(10, 200, 30)];
        assert_eq!(distinct_colors(&samples, 2).len(), 2);
        assert!(distinct_colors(&[], 3).is_empty());
    }

    #[test]
    fn clusters_when_enough_samples() {
        let extraction = extract_from_samples(&red_blue(40), 2, &mut rng(5));
        assert_eq!(extraction.method, ExtractionMethod::KMeans);
        assert_eq!(extraction.swatches.len(), 2);
    }
}
