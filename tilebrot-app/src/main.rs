use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use tilebrot_app::{Explorer, ExplorerPreferences};
use tilebrot_gpu::{GpuAvailability, GpuContext};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Tilebrot");

    let prefs = ExplorerPreferences::load();

    let gpu = if prefs.engine.is_gpu() {
        match pollster::block_on(GpuContext::try_init()) {
            GpuAvailability::Available(context) => Some(Arc::new(context)),
            GpuAvailability::Unavailable(reason) => {
                warn!("GPU unavailable, {} will not compute: {reason}", prefs.engine);
                None
            }
        }
    } else {
        None
    };

    let mut explorer = match Explorer::new(prefs.clone(), gpu) {
        Ok(explorer) => explorer,
        Err(e) => {
            error!("Failed to set up the grid: {e}");
            return ExitCode::FAILURE;
        }
    };

    explorer.compute();
    for step in 1..=prefs.auto_zoom_steps {
        let point = explorer.auto_zoom_step();
        let grid = explorer.grid();
        info!(
            step,
            x = point.x,
            y = point.y,
            found = point.found,
            center_re = grid.center_re(),
            center_im = grid.center_im(),
            diameter = grid.diameter(),
            "auto-zoom step"
        );
    }

    prefs.save();
    ExitCode::SUCCESS
}
