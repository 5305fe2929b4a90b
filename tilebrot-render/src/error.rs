use thiserror::Error;

/// Errors originating from the tile scheduler.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Core(#[from] tilebrot_core::CoreError),
}
