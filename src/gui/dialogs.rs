use eframe::egui;

/// Copy text to the clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_owned())
}

/// Render about dialog; clears `open` when dismissed
pub fn about_window(ctx: &egui::Context, open: &mut bool) {
    if !*open {
        return;
    }

    egui::Window::new("About wslocate")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("wslocate");
                ui.label(format!("Version {}", crate::VERSION));
                ui.add_space(10.0);
                ui.label("Searches the locate index inside WSL");
                ui.label("Requires `locate` installed and `sudo updatedb` run in WSL");
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    *open = false;
                }
            });
        });
}
