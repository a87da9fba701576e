//! deskwidgets — a manager window for always-on-top desktop overlays
//!
//! Each overlay shows a clock, the date, a note, a countdown, a quote or a
//! reminder list. The collection is saved to JSON on exit and restored at
//! startup.

mod app;
mod config;
mod manager;
mod overlay;
mod quotes;
mod state;
mod store;
mod system_info;
mod timer;
mod weather;

use app::DeskWidgetsApp;
use config::AppConfig;
use eframe::NativeOptions;

fn main() -> eframe::Result<()> {
    deskcore::logging::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "invalid configuration, using defaults");
            AppConfig::default()
        }
    };
    tracing::info!(store = %config.store_path.display(), "starting deskwidgets");

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([800.0, 600.0])
        .with_min_inner_size([480.0, 360.0])
        .with_title("desktop widget manager");

    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "deskwidgets",
        options,
        Box::new(move |cc| {
            deskcore::DeskTheme::default().apply(&cc.egui_ctx);
            Box::new(DeskWidgetsApp::new(cc, config))
        }),
    )
}
