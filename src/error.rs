use thiserror::Error;

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cell count must be at least 1")]
    ZeroCellCount,

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidDimension { field: &'static str, value: f32 },

    #[error("invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("unknown cell style {0:?}, expected \"bordered\" or \"underlined\"")]
    UnknownStyle(String),
}

/// Failures of the raster host
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} pixmap")]
    EmptyPixmap { width: u32, height: u32 },
}
