//! Result list rendering
//!
//! Draws [`ViewState::results`] with virtual scrolling and reports what the user
//! did to a row. It never changes state itself.

use crate::ViewState;
use eframe::egui;

/// Something the user did to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Select(usize),
    Open(usize),
    CopyPath(usize),
}

const ROW_HEIGHT: f32 = 18.0;

/// Render the result list. `scroll_to` brings a row into view (keyboard navigation).
pub fn show(ui: &mut egui::Ui, view: &ViewState, scroll_to: Option<usize>) -> Option<RowAction> {
    use egui_extras::{Column, TableBuilder};

    let mut action = None;
    let available_height = ui.available_height();

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(20.0).clip(true))
        .min_scrolled_height(0.0)
        .max_scroll_height(available_height)
        .sense(egui::Sense::click());

    if let Some(row) = scroll_to {
        table = table.scroll_to_row(row, Some(egui::Align::Center));
    }

    table.body(|body| {
        body.rows(ROW_HEIGHT, view.results.len(), |mut row| {
            let index = row.index();
            let Some(path) = view.results.get(index) else {
                return;
            };

            row.set_selected(view.selected == Some(index));
            row.col(|ui| {
                ui.add(egui::Label::new(path.as_str()).selectable(false).truncate());
            });

            let response = row.response();
            if response.double_clicked() {
                action = Some(RowAction::Open(index));
            } else if response.clicked() {
                action = Some(RowAction::Select(index));
            }

            response.context_menu(|ui| {
                if ui.button("Open in Explorer").clicked() {
                    action = Some(RowAction::Open(index));
                    ui.close();
                }
                if ui.button("Copy path").clicked() {
                    action = Some(RowAction::CopyPath(index));
                    ui.close();
                }
            });
        });
    });

    action
}
