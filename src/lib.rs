//! Palette extraction and color-relationship engine.
//!
//! Pixels are clustered with k-means++ in CIE Lab to produce a small palette
//! of [`Swatch`]es. From a palette the crate derives counter-palettes
//! ([`AntiMode`]) and compares two palettes into an [`Analysis`] with a
//! 0–100 compatibility score and suggested bridge colors.
//!
//! Everything here is synchronous and free of shared state; the only source
//! of nondeterminism is the random generator handed to the clustering call.
//! The same engine is exported to JavaScript through `wasm-bindgen`.

use js_sys::{Array, Object, Reflect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen::prelude::*;

pub mod analysis;
pub mod clash;
pub mod color;
pub mod error;
pub mod export;
pub mod quantize;
pub mod sample;
pub mod swatch;

pub use analysis::{Analysis, analyze, bridge_colors, palette_distance};
pub use clash::{AntiMode, complementary_clash, low_contrast_clash};
pub use color::{Lab, TextColor, contrast_text_color, delta_e, lab_to_rgb, rgb_to_hsv, rgb_to_lab};
pub use error::{PaletteError, Result};
pub use export::{to_css_variables, to_json_export};
pub use quantize::{Extraction, ExtractionMethod, extract_from_samples, quantize};
pub use sample::{SamplerConfig, sample_image, sample_rgba, swatch_at};
pub use swatch::{Swatch, hex_of, parse_hex_palette};

/// Extract up to `k` swatches from a flat RGBA buffer.
pub fn extract_palette<R: Rng + ?Sized>(
    rgba: &[u8],
    k: usize,
    config: &SamplerConfig,
    rng: &mut R,
) -> Result<Extraction> {
    let samples = sample_rgba(rgba, config)?;
    Ok(extract_from_samples(&samples, k, rng))
}

/// Decode an encoded image (PNG, JPEG, ...), downscale it and extract up to
/// `k` swatches.
pub fn extract_palette_from_bytes<R: Rng + ?Sized>(
    input: &[u8],
    k: usize,
    config: &SamplerConfig,
    rng: &mut R,
) -> Result<Extraction> {
    let img = image::load_from_memory(input)?;
    let samples = sample_image(&img, config)?;
    Ok(extract_from_samples(&samples, k, rng))
}

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn rng_for(seed: Option<u32>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed as u64),
        None => StdRng::from_os_rng(),
    }
}

fn swatch_to_js(swatch: &Swatch) -> std::result::Result<Object, JsValue> {
    let rgb = Array::new();
    for c in swatch.rgb() {
        rgb.push(&JsValue::from(c));
    }
    let obj = Object::new();
    Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(swatch.hex()))?;
    Reflect::set(&obj, &JsValue::from_str("rgb"), &rgb)?;
    Ok(obj)
}

fn palette_to_js(palette: &[Swatch]) -> std::result::Result<Array, JsValue> {
    let out = Array::new();
    for swatch in palette {
        let obj = swatch_to_js(swatch)?;
        out.push(&obj);
    }
    Ok(out)
}

/// Accepts an array of hex strings or of `{hex}` objects.
fn palette_from_js(values: &Array) -> std::result::Result<Vec<Swatch>, JsValue> {
    let mut out = Vec::new();
    for val in values.iter() {
        let hex = match val.as_string() {
            Some(s) => s,
            None => Reflect::get(&val, &JsValue::from_str("hex"))?
                .as_string()
                .ok_or_else(|| JsValue::from_str("Palette values must be hex strings"))?,
        };
        out.push(Swatch::from_hex(&hex).map_err(js_err)?);
    }
    Ok(out)
}

fn extraction_to_js(extraction: &Extraction) -> std::result::Result<Object, JsValue> {
    let method = match extraction.method {
        ExtractionMethod::KMeans => "k-means",
        ExtractionMethod::DistinctColors => "distinct-colors",
    };
    let palette = palette_to_js(&extraction.swatches)?;
    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("palette"), &palette)?;
    Reflect::set(&result, &JsValue::from_str("method"), &JsValue::from_str(method))?;
    Reflect::set(
        &result,
        &JsValue::from_str("sampleCount"),
        &JsValue::from(extraction.sample_count as u32),
    )?;
    Ok(result)
}

/// Decode an image file and extract a palette of `n_colors` swatches.
///
/// Returns `{ palette: [{hex, rgb}], method, sampleCount }`. Pass a `seed`
/// for reproducible output.
#[wasm_bindgen(js_name = extractPalette)]
pub fn extract_palette_js(
    input: Vec<u8>,
    n_colors: usize,
    seed: Option<u32>,
) -> std::result::Result<Object, JsValue> {
    let extraction = extract_palette_from_bytes(
        &input,
        n_colors,
        &SamplerConfig::default(),
        &mut rng_for(seed),
    )
    .map_err(js_err)?;
    extraction_to_js(&extraction)
}

/// Same as `extractPalette` but for raw RGBA pixels, e.g. `ImageData.data`.
#[wasm_bindgen(js_name = extractPaletteRgba)]
pub fn extract_palette_rgba_js(
    rgba: Vec<u8>,
    n_colors: usize,
    seed: Option<u32>,
) -> std::result::Result<Object, JsValue> {
    let extraction = extract_palette(&rgba, n_colors, &SamplerConfig::default(), &mut rng_for(seed))
        .map_err(js_err)?;
    extraction_to_js(&extraction)
}

/// Counter-palette for `palette` (hex strings). `mode` is `"complement"` or
/// `"low-contrast"`.
#[wasm_bindgen(js_name = antiPalette)]
pub fn anti_palette_js(palette: Array, mode: &str) -> std::result::Result<Array, JsValue> {
    let mode: AntiMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let source = palette_from_js(&palette)?;
    palette_to_js(&mode.apply(&source))
}

/// Compare two palettes. Returns `{ score, label, description, bridgeColors }`.
#[wasm_bindgen(js_name = analyzePalettes)]
pub fn analyze_palettes_js(a: Array, b: Array) -> std::result::Result<Object, JsValue> {
    let a = palette_from_js(&a)?;
    let b = palette_from_js(&b)?;
    let analysis = analyze(&a, &b).map_err(js_err)?;
    let bridges = palette_to_js(&analysis.bridge_colors)?;

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("score"), &JsValue::from(analysis.score))?;
    Reflect::set(&result, &JsValue::from_str("label"), &JsValue::from_str(analysis.label))?;
    Reflect::set(
        &result,
        &JsValue::from_str("description"),
        &JsValue::from_str(analysis.description),
    )?;
    Reflect::set(&result, &JsValue::from_str("bridgeColors"), &bridges)?;
    Ok(result)
}

/// Stylesheet `:root` block with one `--palette-N` variable per swatch.
#[wasm_bindgen(js_name = cssVariables)]
pub fn css_variables_js(palette: Array) -> std::result::Result<String, JsValue> {
    Ok(to_css_variables(&palette_from_js(&palette)?))
}

/// `{mainColors, antiColors, timestamp}` JSON document.
#[wasm_bindgen(js_name = exportJson)]
pub fn export_json_js(
    main: Array,
    anti: Array,
    timestamp: &str,
) -> std::result::Result<String, JsValue> {
    let main = palette_from_js(&main)?;
    let anti = palette_from_js(&anti)?;
    to_json_export(&main, &anti, timestamp).map_err(js_err)
}

/// `"#000000"` or `"#FFFFFF"`, whichever reads better on `hex`.
#[wasm_bindgen(js_name = textColor)]
pub fn text_color_js(hex: &str) -> std::result::Result<String, JsValue> {
    let swatch = Swatch::from_hex(hex).map_err(js_err)?;
    Ok(swatch.text_color().hex().to_string())
}
