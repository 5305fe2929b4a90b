pub mod engine;
pub mod error;
pub mod grid;
pub mod tile;

pub use engine::TileKernel;
pub use error::RenderError;
pub use grid::GridCalculator;
pub use tile::{build_tile_grid, Tile};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
