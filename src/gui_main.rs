//! wslocate GUI Entry Point
//!
//! Opens the search window without a console.

#![windows_subsystem = "windows"]

use wslocate::BridgeConfig;

fn main() -> wslocate::Result<()> {
    wslocate::logging::init();
    wslocate::logging::separator("GUI START");

    wslocate::gui::run(BridgeConfig::default())
}
