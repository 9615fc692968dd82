//! Main wslocate window

use crate::gui::dialogs;
use crate::gui::search::SearchForm;
use crate::gui::table::{self, RowAction};
use crate::{logging, BridgeConfig, Dispatcher, Inbox, Presenter, SystemRunner, ViewState, POLL_INTERVAL};
use eframe::egui;
use std::sync::Arc;

/// Everything the window asked for this frame, applied once rendering is done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Search,
    Row(RowAction),
    SelectNext,
    SelectPrev,
    OpenSelected,
}

/// Navigation keys pressed this frame
#[derive(Debug, Clone, Copy, Default)]
struct KeyPresses {
    down: bool,
    up: bool,
    enter: bool,
}

/// List navigation for this frame's keys. Enter opens the selection only when
/// the search field did not already take it to start a search.
fn keyboard_actions(keys: KeyPresses, search_took_enter: bool) -> Vec<UiAction> {
    let mut actions = Vec::new();
    if keys.down {
        actions.push(UiAction::SelectNext);
    }
    if keys.up {
        actions.push(UiAction::SelectPrev);
    }
    if keys.enter && !search_took_enter {
        actions.push(UiAction::OpenSelected);
    }
    actions
}

/// Main application state
pub struct LocateApp {
    presenter: Presenter<Dispatcher>,
    form: SearchForm,
    show_about: bool,
    /// Row to bring into view on the next frame
    scroll_to: Option<usize>,
}

impl LocateApp {
    /// Create a new LocateApp
    pub fn new(_cc: &eframe::CreationContext<'_>, config: BridgeConfig) -> Self {
        let inbox = Inbox::new();
        let dispatcher = Dispatcher::new(Arc::new(SystemRunner), config, inbox.sender());

        Self {
            presenter: Presenter::new(dispatcher, inbox),
            form: SearchForm::new(),
            show_about: false,
            scroll_to: None,
        }
    }

    /// Render menu bar
    fn render_menu(ctx: &egui::Context, view: &ViewState, show_about: &mut bool, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let selected = view.selected;
                    if ui
                        .add_enabled(selected.is_some(), egui::Button::new("Open in Explorer"))
                        .clicked()
                    {
                        actions.push(UiAction::OpenSelected);
                        ui.close();
                    }
                    if ui
                        .add_enabled(selected.is_some(), egui::Button::new("Copy Path"))
                        .clicked()
                    {
                        if let Some(index) = selected {
                            actions.push(UiAction::Row(RowAction::CopyPath(index)));
                        }
                        ui.close();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About wslocate").clicked() {
                        *show_about = true;
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render search bar and the option checkboxes. Returns true when Enter was
    /// pressed in the search field this frame.
    fn render_search_bar(
        ctx: &egui::Context,
        view: &ViewState,
        form: &mut SearchForm,
        actions: &mut Vec<UiAction>,
    ) -> bool {
        let mut took_enter = false;
        egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let button_width = 80.0;
                let response = ui.add(
                    egui::TextEdit::singleline(&mut form.query)
                        .desired_width(ui.available_width() - button_width)
                        .hint_text("Search the locate index..."),
                );

                if form.first_frame {
                    response.request_focus();
                    form.first_frame = false;
                }

                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                took_enter = enter;
                let clicked = ui
                    .add_enabled(view.trigger_enabled(), egui::Button::new("Search"))
                    .clicked();

                if (enter && view.trigger_enabled()) || clicked {
                    actions.push(UiAction::Search);
                }
            });

            ui.horizontal(|ui| {
                ui.checkbox(&mut form.options.ignore_case, "Ignore case");
                ui.checkbox(&mut form.options.existing_only, "Existing files only");
                ui.checkbox(&mut form.options.basename_only, "Filename only (no directories)");
            });
            ui.add_space(4.0);
        });
        took_enter
    }

    /// Render status bar
    fn render_status_bar(ctx: &egui::Context, view: &ViewState) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if view.busy {
                    ui.spinner();
                }
                ui.label(&view.status);

                if let Some(path) = view.selected_path() {
                    ui.separator();
                    ui.add(egui::Label::new(path).truncate());
                }
            });
        });
    }

    /// Keyboard navigation over the list, only while no text field has focus
    fn read_keyboard(ctx: &egui::Context, search_took_enter: bool, actions: &mut Vec<UiAction>) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys = ctx.input(|i| KeyPresses {
            down: i.key_pressed(egui::Key::ArrowDown),
            up: i.key_pressed(egui::Key::ArrowUp),
            enter: i.key_pressed(egui::Key::Enter),
        });
        actions.extend(keyboard_actions(keys, search_took_enter));
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Search => {
                // An empty term only sets the status line
                if let Ok(seq) = self.presenter.start_search(&self.form.query, self.form.options) {
                    logging::debug("APP", &format!("search #{} started for '{}'", seq, self.form.query));
                }
            }
            UiAction::Row(RowAction::Select(index)) => self.presenter.select(Some(index)),
            UiAction::Row(RowAction::Open(index)) => {
                self.presenter.select(Some(index));
                self.presenter.open_selection();
            }
            UiAction::Row(RowAction::CopyPath(index)) => {
                let Some(path) = self.presenter.view().results.get(index).cloned() else {
                    return;
                };
                match dialogs::copy_to_clipboard(&path) {
                    Ok(()) => self.presenter.notify(format!("Copied {}", path)),
                    Err(e) => {
                        logging::warn("APP", &format!("clipboard: {}", e));
                        self.presenter.notify(format!("Error copying path: {}", e));
                    }
                }
            }
            UiAction::SelectNext => {
                self.presenter.select_next();
                self.scroll_to = self.presenter.view().selected;
            }
            UiAction::SelectPrev => {
                self.presenter.select_prev();
                self.scroll_to = self.presenter.view().selected;
            }
            UiAction::OpenSelected => self.presenter.open_selection(),
        }
    }
}

impl eframe::App for LocateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.presenter.poll();

        // Rendering only reads the view; requests are collected and applied afterwards
        let mut actions = Vec::new();
        let scroll_to = self.scroll_to.take();
        let search_took_enter;
        {
            let view = self.presenter.view();
            Self::render_menu(ctx, view, &mut self.show_about, &mut actions);
            search_took_enter = Self::render_search_bar(ctx, view, &mut self.form, &mut actions);
            Self::render_status_bar(ctx, view);
            dialogs::about_window(ctx, &mut self.show_about);

            egui::CentralPanel::default().show(ctx, |ui| {
                if let Some(row_action) = table::show(ui, view, scroll_to) {
                    actions.push(UiAction::Row(row_action));
                }
            });
        }
        Self::read_keyboard(ctx, search_took_enter, &mut actions);

        for action in actions {
            self.apply(action);
        }

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
