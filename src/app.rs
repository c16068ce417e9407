use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::{TimelineClient, TimelineResponse};
use crate::config::{AppSettings, SettingsStore};
use crate::model::{normalize, DateCommit, InteractionController, Zoom};
use crate::state::TimelineState;
use crate::ui;
use crate::ui::dialogs::SettingsDraft;
use crate::ui::item_editor::{DateDraft, ItemEditorAction};
use crate::ui::item_table::ItemTableAction;
use crate::ui::toolbar::ToolbarAction;
use crate::worker::{Request, Response, Worker};

/// Main application state.
pub struct TimelineApp {
    pub settings: AppSettings,
    store: SettingsStore,
    pub state: TimelineState,
    pub zoom: Zoom,
    zoom_dirty: bool,
    controller: InteractionController,
    pub selected: Option<String>,
    draft: Option<DateDraft>,
    worker: Worker,
    today: NaiveDate,

    // Dialog state
    pub show_settings: bool,
    pub show_about: bool,
    pub settings_draft: SettingsDraft,

    // Status message
    pub status_message: String,
    pub status_is_error: bool,
}

impl TimelineApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        store: SettingsStore,
        client: TimelineClient,
    ) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        // Ctrl+/- zooms the timeline, not the whole UI
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);
        ui::theme::apply_theme(&cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        let worker = Worker::spawn(client, move || ctx.request_repaint());

        let mut app = Self {
            zoom: settings.zoom(),
            settings_draft: SettingsDraft::from_settings(&settings),
            settings,
            store,
            state: TimelineState::new(),
            zoom_dirty: false,
            controller: InteractionController::new(),
            selected: None,
            draft: None,
            worker,
            today: chrono::Local::now().date_naive(),
            show_settings: false,
            show_about: false,
            status_message: "Ready".to_string(),
            status_is_error: false,
        };
        app.refresh();
        app
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = true;
    }

    pub fn refresh(&mut self) {
        let project_id = self.settings.project_id;
        self.worker.send(Request::Fetch { project_id });
        self.set_status(format!("Loading project {project_id}..."));
    }

    fn apply_timeline(&mut self, timeline: TimelineResponse) {
        // a live gesture refers to rows that may no longer exist
        self.controller.cancel();
        self.state.replace(timeline);
        self.draft = None;
        if let Some(id) = &self.selected {
            if self.state.find(id).is_none() {
                self.selected = None;
            }
        }
        let loaded = self.state.items.len();
        self.set_status(format!(
            "Loaded {} ({} items)",
            self.state.project_name(),
            loaded
        ));
    }

    /// Apply the new dates locally and send them to the server.
    fn commit_dates(&mut self, commit: DateCommit) {
        if !self.state.apply_optimistic(&commit) {
            self.set_error(format!("'{}' is no longer on the timeline", commit.item_id));
            return;
        }
        info!(
            item = %commit.item_id,
            start = %commit.start_iso(),
            end = %commit.end_iso(),
            "committing new dates"
        );
        self.set_status(format!(
            "Saving {} → {}...",
            commit.start_iso(),
            commit.end_iso()
        ));
        self.selected = Some(commit.item_id.clone());
        self.draft = None;
        self.worker.send(Request::Update {
            project_id: self.settings.project_id,
            commit,
        });
    }

    fn poll_worker(&mut self) {
        for response in self.worker.poll() {
            match response {
                Response::Timeline(timeline) => self.apply_timeline(timeline),
                Response::FetchFailed(error) => {
                    self.set_error(format!("Could not load timeline: {error}"));
                }
                Response::Updated { commit, response } => {
                    self.state.confirm(&commit);
                    if response.status != "success" {
                        warn!(status = %response.status, "unexpected update status");
                    }
                    let stored = &response.updated;
                    info!(
                        kind = stored.item_type.as_str(),
                        id = stored.id,
                        start = stored.start_date.as_deref().unwrap_or("None"),
                        end = stored.end_date.as_deref().unwrap_or("None"),
                        "server stored new dates"
                    );
                    let name = self
                        .state
                        .find(&commit.item_id)
                        .map(|item| item.name.clone())
                        .unwrap_or_else(|| commit.item_id.clone());
                    self.refresh();
                    self.set_status(format!(
                        "Updated '{}' ({} → {})",
                        name,
                        commit.start_iso(),
                        commit.end_iso()
                    ));
                }
                Response::UpdateFailed { commit, error } => {
                    let name = self
                        .state
                        .rollback(&commit)
                        .unwrap_or_else(|| commit.item_id.clone());
                    self.draft = None;
                    self.set_error(format!("Could not update '{name}': {error}"));
                }
            }
        }
    }

    /// Switch to new connection settings: rebuild the client, persist, reload.
    pub fn apply_settings(&mut self, settings: AppSettings) {
        let mut client = match TimelineClient::new(&settings.base_url, settings.request_timeout()) {
            Ok(client) => client,
            Err(e) => {
                self.set_error(format!("Could not create HTTP client: {e}"));
                return;
            }
        };
        client.set_auth(settings.access_token.clone());

        let project_changed = settings.project_id != self.settings.project_id;
        self.settings = settings;
        self.worker.send(Request::Reconnect(Box::new(client)));
        if project_changed {
            self.controller.cancel();
            self.state = TimelineState::new();
            self.selected = None;
            self.draft = None;
        }
        self.refresh();
        self.save_settings();
    }

    fn save_settings(&mut self) {
        self.settings.pixels_per_day = self.zoom.pixels_per_day();
        if let Err(e) = self.store.save(&self.settings) {
            warn!("{e}");
            self.set_error(format!("Error saving settings: {e}"));
        }
    }

    fn zoom_by(&mut self, zoom_in: bool) {
        if self.controller.is_dragging() {
            return;
        }
        if zoom_in {
            self.zoom.zoom_in();
        } else {
            self.zoom.zoom_out();
        }
        self.zoom_dirty = true;
    }

    fn handle_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Refresh => self.refresh(),
            ToolbarAction::ZoomIn => self.zoom_by(true),
            ToolbarAction::ZoomOut => self.zoom_by(false),
            ToolbarAction::ExpandAll => self.state.expand_all(),
            ToolbarAction::CollapseAll => self.state.collapse_all(),
            ToolbarAction::OpenSettings => {
                self.settings_draft = SettingsDraft::from_settings(&self.settings);
                self.show_settings = true;
            }
            ToolbarAction::OpenSettingsFolder => {
                let dir = self.store.dir().to_path_buf();
                if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
                    self.set_error(format!("Could not open {}: {e}", dir.display()));
                }
            }
            ToolbarAction::About => self.show_about = true,
            ToolbarAction::None => {}
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        let busy = self.worker.is_busy();

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let dialog_open = self.show_settings || self.show_about;
        let (refresh, zoom_in, zoom_out, escape, ctrl_held) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::F5),
                i.modifiers.ctrl && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)),
                i.modifiers.ctrl && i.key_pressed(egui::Key::Minus),
                i.key_pressed(egui::Key::Escape),
                i.modifiers.ctrl,
            )
        });
        if refresh && !busy {
            self.refresh();
        }
        if zoom_in {
            self.zoom_by(true);
        }
        if zoom_out {
            self.zoom_by(false);
        }
        if escape && !dialog_open {
            if self.controller.is_dragging() {
                self.controller.cancel();
                self.set_status("Drag cancelled");
            } else {
                self.selected = None;
            }
        }

        // Top panel: toolbar
        let mut toolbar_action = ToolbarAction::None;
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar_action = ui::toolbar::show_toolbar(self.state.project_name(), busy, ui);
        });
        self.handle_toolbar(toolbar_action);

        let normalized = normalize(&self.state.items, &self.state.expansion, self.today);

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS_BAR)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(if self.status_is_error {
                                ui::theme::ERROR_TEXT
                            } else {
                                ui::theme::TEXT_SECONDARY
                            }),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Items: {} / {}",
                                normalized.visible.len(),
                                self.state.total_items
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(" · ")
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "Zoom: {:.0} px/day",
                                self.zoom.pixels_per_day()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: item editor + item table
        let mut table_action = ItemTableAction::None;
        let mut editor_action = ItemEditorAction::None;
        egui::SidePanel::left("item_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(ui::theme::SIDE_PANEL_MIN_WIDTH)
            .max_width(ui::theme::SIDE_PANEL_WIDTH * 2.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(6.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                // If an item is selected, show its details at the top
                if let Some(item) = self
                    .selected
                    .as_deref()
                    .and_then(|id| normalized.index.get(id))
                {
                    let stale = self.draft.as_ref().map_or(true, |d| d.item_id != item.id);
                    if stale {
                        self.draft = Some(DateDraft::for_item(item, &normalized.window));
                    }
                    if let Some(draft) = self.draft.as_mut() {
                        editor_action = ui::item_editor::show_item_editor(item, draft, !busy, ui);
                    }
                    ui.add_space(4.0);
                    ui.separator();
                    ui.add_space(2.0);
                }

                table_action = ui::item_table::show_item_table(
                    &normalized.index,
                    &normalized.visible,
                    &self.state.expansion,
                    self.selected.as_deref(),
                    ui,
                );
            });

        // Central panel: timeline chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let chart_interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::timeline_chart::show_timeline_chart(
                    &normalized,
                    &mut self.controller,
                    &mut self.zoom,
                    self.selected.as_deref(),
                    !busy,
                    self.today,
                    ui,
                )
            })
            .inner;
        drop(normalized);

        // Handle item table actions
        match table_action {
            ItemTableAction::Select(id) => self.selected = Some(id),
            ItemTableAction::Toggle(id) => {
                self.state.expansion.toggle(&id);
            }
            ItemTableAction::None => {}
        }

        match editor_action {
            ItemEditorAction::Commit(commit) => self.commit_dates(commit),
            ItemEditorAction::Invalid(msg) => self.set_error(msg),
            ItemEditorAction::None => {}
        }

        if chart_interaction.clear_selection {
            self.selected = None;
        }
        if let Some(id) = chart_interaction.select {
            self.selected = Some(id);
        }
        if let Some(commit) = chart_interaction.commit {
            self.commit_dates(commit);
        }
        if chart_interaction.zoomed {
            self.zoom_dirty = true;
        }

        // Persist the zoom once the Ctrl+scroll gesture is over
        if self.zoom_dirty && !ctrl_held {
            self.zoom_dirty = false;
            self.save_settings();
        }

        // Dialogs
        if self.show_settings {
            ui::dialogs::show_settings_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
