use thiserror::Error;

/// Errors originating from the core engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid dimensions: {width}×{height} (both must be > 0)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid grid layout: {rows}×{cols} (rows and cols must be >= 1)")]
    InvalidGrid { rows: u32, cols: u32 },

    #[error("unknown engine: {0:?}")]
    UnknownEngine(String),
}
