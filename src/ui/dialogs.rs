use crate::app::TimelineApp;
use crate::config::AppSettings;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Editable copy of the connection settings shown in the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDraft {
    pub base_url: String,
    pub project_id: String,
    pub access_token: String,
    pub error: Option<String>,
}

impl SettingsDraft {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            project_id: settings.project_id.to_string(),
            access_token: settings.access_token.clone().unwrap_or_default(),
            error: None,
        }
    }

    /// Validate the fields and produce the updated settings.
    pub fn apply_to(&self, current: &AppSettings) -> Result<AppSettings, String> {
        let base_url = self.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err("Server URL must start with http:// or https://".to_string());
        }
        let project_id = self
            .project_id
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("'{}' is not a valid project id", self.project_id.trim()))?;
        let token = self.access_token.trim();

        Ok(AppSettings {
            base_url: base_url.to_string(),
            project_id,
            access_token: (!token.is_empty()).then(|| token.to_string()),
            ..current.clone()
        })
    }
}

/// Render the connection settings dialog.
pub fn show_settings_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    let mut should_apply = false;

    Window::new(RichText::new("Connection").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            let draft = &mut app.settings_draft;
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Server").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut draft.base_url)
                            .hint_text("http://localhost:8000"),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Project id").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut draft.project_id),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Access token").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut draft.access_token)
                            .password(true)
                            .hint_text("JWT access token"),
                    );
                    ui.end_row();
                });

            if let Some(error) = &draft.error {
                ui.add_space(4.0);
                ui.label(RichText::new(error).color(theme::ERROR_TEXT));
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Connect").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    should_apply = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_apply {
        match app.settings_draft.apply_to(&app.settings) {
            Ok(settings) => {
                app.apply_settings(settings);
                should_close = true;
            }
            Err(e) => app.settings_draft.error = Some(e),
        }
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_settings = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([280.0, 170.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("ClickPM Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag bars to reschedule, drag edges to resize.");
                ui.label(
                    RichText::new(format!("Server: {}", app.settings.base_url))
                        .size(10.5)
                        .color(theme::TEXT_DIM),
                );
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
