pub mod chooser;
pub mod engine;
pub mod error;
pub mod escape;
pub mod kernel;
pub mod navigation;
pub mod storage;
pub mod viewport;

pub use chooser::{ZoomPoint, ZoomPointChooser};
pub use engine::EngineType;
pub use error::CoreError;
pub use escape::{escape_time, MAX_ITER};
pub use kernel::{BorderKernel, Kernel, SimdKernel, StandardKernel};
pub use storage::StorageBuffer;
pub use viewport::Viewport;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
