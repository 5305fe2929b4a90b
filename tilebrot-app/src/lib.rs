pub mod app_dir;
pub mod explorer;
pub mod preferences;

pub use explorer::{grid_layout, Explorer};
pub use preferences::ExplorerPreferences;
