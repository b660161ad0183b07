use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaletteError>;

/// Caller contract violations and decode failures.
///
/// Numeric degenerate cases (no samples, `k == 0`) are not errors; they yield
/// an empty palette.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("RGBA buffer length {0} is not a multiple of 4")]
    InvalidBufferLength(usize),

    #[error("invalid hex color {0:?}, expected #RRGGBB")]
    InvalidHex(String),

    #[error("cannot analyze an empty palette")]
    EmptyPalette,

    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("unable to decode image: {0}")]
    Image(#[from] image::ImageError),
}
