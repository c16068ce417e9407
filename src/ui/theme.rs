use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::ItemType;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_FIELD: Color32 = Color32::from_rgb(20, 20, 28);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);
pub const BG_STATUS_BAR: Color32 = Color32::from_rgb(26, 26, 36);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const TODAY_LINE: Color32 = Color32::from_rgb(240, 75, 75);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
pub const DEP_ARROW: Color32 = Color32::from_rgba_premultiplied(150, 120, 65, 110);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(240, 110, 100);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const ROW_HEIGHT: f32 = 30.0;
pub const ROW_GAP: f32 = 2.0;
pub const HEADER_HEIGHT: f32 = 44.0;
pub const HANDLE_WIDTH: f32 = 7.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 5.0; // vertical inset so bars don't touch row edges
pub const STATUS_BAR_HEIGHT: f32 = 24.0;
pub const SIDE_PANEL_WIDTH: f32 = 320.0;
pub const SIDE_PANEL_MIN_WIDTH: f32 = 220.0;
pub const DIALOG_WIDTH: f32 = 340.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

pub fn font_menu() -> FontId {
    FontId::proportional(12.0)
}

// ── Item colors ──────────────────────────────────────────────────────────────

/// Base color for an item type, used when the status is unknown.
pub fn type_color(item_type: ItemType) -> Color32 {
    match item_type {
        ItemType::Project => Color32::from_rgb(66, 133, 244),
        ItemType::Milestone => Color32::from_rgb(171, 71, 188),
        ItemType::Sprint => Color32::from_rgb(0, 188, 212),
        ItemType::Task => Color32::from_rgb(120, 130, 150),
    }
}

/// Bar color for a status string. Unknown statuses fall back to the
/// item type's color.
pub fn status_color(status: &str, item_type: ItemType) -> Color32 {
    match status.trim().to_lowercase().as_str() {
        "done" | "completed" | "complete" | "finished" => Color32::from_rgb(52, 168, 83),
        "in progress" | "in-progress" | "active" => Color32::from_rgb(66, 133, 244),
        "review" | "in review" => Color32::from_rgb(251, 140, 0),
        "blocked" | "on hold" => Color32::from_rgb(229, 57, 53),
        "to-do" | "todo" | "not started" | "planned" => type_color(item_type),
        _ => type_color(item_type),
    }
}

/// Lighter tint of `color`, used for the not-yet-done part of a bar.
pub fn tint(color: Color32) -> Color32 {
    let mix = |c: u8| c + ((255 - c) as f32 * 0.45) as u8;
    Color32::from_rgb(mix(color.r()), mix(color.g()), mix(color.b())).gamma_multiply(0.55)
}

pub fn priority_color(priority: &str) -> Color32 {
    match priority.trim().to_lowercase().as_str() {
        "critical" => Color32::from_rgb(229, 57, 53),
        "high" => Color32::from_rgb(251, 140, 0),
        "medium" => Color32::from_rgb(255, 193, 7),
        "low" => Color32::from_rgb(52, 168, 83),
        _ => TEXT_DIM,
    }
}

pub fn type_icon(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Project => egui_phosphor::regular::FOLDER,
        ItemType::Milestone => egui_phosphor::regular::FLAG,
        ItemType::Sprint => egui_phosphor::regular::LIGHTNING,
        ItemType::Task => egui_phosphor::regular::CHECK_SQUARE,
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_FIELD; // TextEdit bg

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = Color32::from_rgb(60, 62, 76);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    visuals.striped = false;
    visuals.faint_bg_color = BG_PANEL;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_falls_back_to_type_color() {
        assert_eq!(
            status_color("Waiting on vendor", ItemType::Sprint),
            type_color(ItemType::Sprint)
        );
        assert_eq!(
            status_color(" Done ", ItemType::Task),
            status_color("done", ItemType::Project)
        );
    }

    #[test]
    fn tint_is_lighter_and_translucent() {
        let base = Color32::from_rgb(66, 133, 244);
        let light = tint(base);
        assert!(light.a() < 255);
        assert_ne!(light, base);
    }
}
