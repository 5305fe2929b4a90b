use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use tilebrot_core::EngineType;

/// Persistent explorer settings, stored as JSON in the config directory.
///
/// Every field has a serde default so files written by older builds, or
/// edited by hand with fields missing, still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerPreferences {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub engine: EngineType,
    /// Parallel tiles with no intermediate redraws.
    #[serde(default)]
    pub speed_mode: bool,
    #[serde(default = "default_speed_grid")]
    pub speed_grid_rows: u32,
    #[serde(default = "default_speed_grid")]
    pub speed_grid_cols: u32,
    /// Number of auto-zoom steps the headless run performs.
    #[serde(default = "default_auto_zoom_steps")]
    pub auto_zoom_steps: u32,
    /// Fixed RNG seed for reproducible exploration. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_speed_grid() -> u32 {
    4
}
fn default_auto_zoom_steps() -> u32 {
    10
}

impl Default for ExplorerPreferences {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            engine: EngineType::default(),
            speed_mode: false,
            speed_grid_rows: default_speed_grid(),
            speed_grid_cols: default_speed_grid(),
            auto_zoom_steps: default_auto_zoom_steps(),
            seed: None,
        }
    }
}

impl ExplorerPreferences {
    /// Load preferences from the config directory, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<ExplorerPreferences>(&json) {
                    Ok(prefs) => {
                        info!("Loaded preferences from {}", path.display());
                        return prefs;
                    }
                    Err(e) => {
                        error!("Failed to parse preferences: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read preferences file: {e}");
                }
            }
        } else {
            debug!("No preferences file at {}", path.display());
        }
        Self::default()
    }

    /// Persist preferences to disk.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }
}

fn config_path() -> PathBuf {
    crate::app_dir::config_dir().join("preferences.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tilebrot-prefs-{}", std::process::id()))
            .join(format!("{name}.json"))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let prefs = ExplorerPreferences::load_from(&scratch_path("does-not-exist"));
        assert_eq!(prefs, ExplorerPreferences::default());
    }

    #[test]
    fn saved_preferences_load_back() {
        let path = scratch_path("round-trip");
        let prefs = ExplorerPreferences {
            width: 320,
            height: 200,
            engine: EngineType::GpuDouble,
            speed_mode: true,
            speed_grid_rows: 3,
            speed_grid_cols: 5,
            auto_zoom_steps: 2,
            seed: Some(42),
        };
        prefs.save_to(&path);
        assert_eq!(ExplorerPreferences::load_from(&path), prefs);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let json = r#"{ "engine": "simd", "speed_mode": true }"#;
        let prefs: ExplorerPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.engine, EngineType::Simd);
        assert!(prefs.speed_mode);
        assert_eq!((prefs.width, prefs.height), (800, 600));
        assert_eq!((prefs.speed_grid_rows, prefs.speed_grid_cols), (4, 4));
        assert_eq!(prefs.seed, None);
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let path = scratch_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            ExplorerPreferences::load_from(&path),
            ExplorerPreferences::default()
        );
        let _ = fs::remove_file(&path);
    }
}
