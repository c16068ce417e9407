use crate::ui::theme;
use egui::{menu, RichText, Ui};

/// Actions the menu bar can request.
pub enum ToolbarAction {
    None,
    Refresh,
    ZoomIn,
    ZoomOut,
    ExpandAll,
    CollapseAll,
    OpenSettings,
    OpenSettingsFolder,
    About,
}

/// Render the top toolbar / menu bar.
pub fn show_toolbar(project_name: &str, busy: bool, ui: &mut Ui) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Timeline  ").font(theme::font_menu()), |ui| {
            if ui
                .add_enabled(!busy, egui::Button::new("  Refresh              F5"))
                .clicked()
            {
                action = ToolbarAction::Refresh;
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Expand All").clicked() {
                action = ToolbarAction::ExpandAll;
                ui.close_menu();
            }
            if ui.button("  Collapse All").clicked() {
                action = ToolbarAction::CollapseAll;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                action = ToolbarAction::ZoomIn;
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                action = ToolbarAction::ZoomOut;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Settings  ").font(theme::font_menu()), |ui| {
            if ui.button("  Connection...").clicked() {
                action = ToolbarAction::OpenSettings;
                ui.close_menu();
            }
            if ui.button("  Open Settings Folder").clicked() {
                action = ToolbarAction::OpenSettingsFolder;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                action = ToolbarAction::About;
                ui.close_menu();
            }
        });

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if busy {
                ui.spinner();
            }
            ui.label(RichText::new(project_name).size(11.0).weak());
        });
    });

    action
}
