use crate::model::layout::indent_for;
use crate::model::{ExpansionState, ItemIndex, TimelineItem};
use crate::ui::theme;
use egui::{Align2, Color32, Pos2, Rect, RichText, Sense, Ui, Vec2};

/// Actions that the item table can request.
pub enum ItemTableAction {
    None,
    Select(String),
    Toggle(String),
}

/// Render the left-side list of visible rows: hierarchy carets, type icon,
/// name, progress, priority and assignee initials.
pub fn show_item_table(
    index: &ItemIndex<'_>,
    visible: &[&TimelineItem],
    expansion: &ExpansionState,
    selected: Option<&str>,
    ui: &mut Ui,
) -> ItemTableAction {
    let mut action = ItemTableAction::None;

    // Header area, same height as the chart header so rows line up
    let (header_rect, _) = ui.allocate_exact_size(
        Vec2::new(ui.available_width(), theme::HEADER_HEIGHT),
        Sense::hover(),
    );
    ui.painter()
        .rect_filled(header_rect, 0.0, theme::BG_HEADER);
    ui.painter().text(
        Pos2::new(header_rect.left() + 8.0, header_rect.top() + 14.0),
        Align2::LEFT_CENTER,
        "Items",
        egui::FontId::proportional(15.0),
        theme::TEXT_PRIMARY,
    );
    ui.painter().text(
        Pos2::new(header_rect.left() + 58.0, header_rect.top() + 15.0),
        Align2::LEFT_CENTER,
        format!("({} of {})", visible.len(), index.len()),
        theme::font_sub(),
        theme::TEXT_DIM,
    );
    ui.painter().text(
        Pos2::new(header_rect.left() + 8.0, header_rect.bottom() - 10.0),
        Align2::LEFT_CENTER,
        "NAME",
        theme::font_small(),
        theme::TEXT_DIM,
    );
    ui.painter().text(
        Pos2::new(header_rect.right() - 8.0, header_rect.bottom() - 10.0),
        Align2::RIGHT_CENTER,
        "DONE   PRI   WHO",
        theme::font_small(),
        theme::TEXT_DIM,
    );

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 0.0;
            for (i, item) in visible.iter().enumerate() {
                let is_selected = selected == Some(item.id.as_str());
                let (row_rect, row) = ui.allocate_exact_size(
                    Vec2::new(ui.available_width(), theme::ROW_HEIGHT + theme::ROW_GAP),
                    Sense::click(),
                );

                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };
                let painter = ui.painter_at(row_rect);
                painter.rect_filled(row_rect, 0.0, row_bg);

                let center_y = row_rect.center().y;
                let mut x = row_rect.left() + 6.0 + indent_for(item.level);

                // Expand/collapse caret, only on rows that have children
                if index.has_children(&item.id) {
                    let caret_rect =
                        Rect::from_center_size(Pos2::new(x + 6.0, center_y), Vec2::splat(16.0));
                    let caret = ui.interact(
                        caret_rect,
                        egui::Id::new(("item-caret", &item.id)),
                        Sense::click(),
                    );
                    let glyph = if expansion.is_expanded(&item.id) {
                        egui_phosphor::regular::CARET_DOWN
                    } else {
                        egui_phosphor::regular::CARET_RIGHT
                    };
                    painter.text(
                        caret_rect.center(),
                        Align2::CENTER_CENTER,
                        glyph,
                        theme::font_bar(),
                        if caret.hovered() {
                            theme::TEXT_PRIMARY
                        } else {
                            theme::TEXT_SECONDARY
                        },
                    );
                    if caret.clicked() {
                        action = ItemTableAction::Toggle(item.id.clone());
                    }
                }
                x += 16.0;

                painter.text(
                    Pos2::new(x + 6.0, center_y),
                    Align2::CENTER_CENTER,
                    theme::type_icon(item.item_type),
                    theme::font_bar(),
                    theme::type_color(item.item_type),
                );
                x += 18.0;

                // Right-hand columns
                let right = row_rect.right() - 8.0;
                if let Some(assignee) = &item.assignee {
                    let badge = Pos2::new(right - 9.0, center_y);
                    painter.circle_filled(badge, 9.0, theme::ACCENT.gamma_multiply(0.6));
                    painter.text(
                        badge,
                        Align2::CENTER_CENTER,
                        &assignee.initials,
                        theme::font_small(),
                        Color32::WHITE,
                    );
                }
                if let Some(priority) = item.shown_priority() {
                    painter.circle_filled(
                        Pos2::new(right - 36.0, center_y),
                        3.5,
                        theme::priority_color(priority),
                    );
                }
                painter.text(
                    Pos2::new(right - 50.0, center_y),
                    Align2::RIGHT_CENTER,
                    format!("{}%", item.progress),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );

                // Name, clipped before the columns
                let name_clip = Rect::from_min_max(
                    Pos2::new(x, row_rect.top()),
                    Pos2::new((right - 84.0).max(x), row_rect.bottom()),
                );
                let name_color = if is_selected {
                    Color32::WHITE
                } else if item.editable {
                    theme::TEXT_PRIMARY
                } else {
                    theme::TEXT_SECONDARY
                };
                painter.with_clip_rect(name_clip).text(
                    Pos2::new(x, center_y),
                    Align2::LEFT_CENTER,
                    &item.name,
                    theme::font_bar(),
                    name_color,
                );

                let row = row.on_hover_text(item.date_range_label());
                if row.clicked() && matches!(action, ItemTableAction::None) {
                    action = ItemTableAction::Select(item.id.clone());
                }
            }

            if index.is_empty() {
                ui.add_space(12.0);
                ui.label(RichText::new("No items loaded").color(theme::TEXT_DIM));
            }
        });

    action
}
