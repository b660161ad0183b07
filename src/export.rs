//! Text exports of extracted palettes.

use serde::Serialize;

use crate::swatch::Swatch;

/// JSON document holding a palette, its counter-palette and a timestamp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteExport<'a> {
    pub main_colors: &'a [Swatch],
    pub anti_colors: &'a [Swatch],
    pub timestamp: &'a str,
}

/// Pretty-printed `{mainColors, antiColors, timestamp}` JSON.
pub fn to_json_export(
    main: &[Swatch],
    anti: &[Swatch],
    timestamp: &str,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&PaletteExport {
        main_colors: main,
        anti_colors: anti,
        timestamp,
    })
}

/// `:root` block declaring `--palette-1` .. `--palette-N`.
pub fn to_css_variables(palette: &[Swatch]) -> String {
    let lines: Vec<String> = palette
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  --palette-{}: {};", i + 1, s.hex()))
        .collect();
    format!(":root{{\n{}\n}}\n", lines.join("\n"))
}
