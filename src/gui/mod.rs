pub mod app;
pub mod dialogs;
pub mod search;
pub mod table;

pub use app::LocateApp;

use crate::BridgeConfig;

/// Entry point: launch the native GUI window
pub fn run(config: BridgeConfig) -> crate::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("WSL Locate Search")
            .with_inner_size([800.0, 560.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "wslocate",
        native_options,
        Box::new(move |cc| Ok(Box::new(LocateApp::new(cc, config)))),
    )
    .map_err(|e| crate::LocateError::Gui(e.to_string()))
}
