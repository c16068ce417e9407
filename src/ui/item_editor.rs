use chrono::NaiveDate;
use egui::{RichText, Ui};

use crate::model::{DateCommit, TimelineItem, TimelineWindow};
use crate::ui::theme;

/// Actions the editor can request.
pub enum ItemEditorAction {
    None,
    Commit(DateCommit),
    Invalid(String),
}

/// Pending date edits for the selected item, kept between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDraft {
    pub item_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateDraft {
    pub fn for_item(item: &TimelineItem, window: &TimelineWindow) -> Self {
        Self {
            item_id: item.id.clone(),
            start: item.effective_start(window),
            end: item.effective_end(window),
        }
    }

    /// Turn the draft into an update. `Ok(None)` when nothing changed.
    pub fn to_commit(&self, item: &TimelineItem) -> Result<Option<DateCommit>, String> {
        if self.end < self.start {
            return Err("End date must not be before the start date".to_string());
        }
        if item.start_date == Some(self.start) && item.end_date == Some(self.end) {
            return Ok(None);
        }
        Ok(Some(DateCommit {
            item_id: item.id.clone(),
            start: self.start,
            end: self.end,
            previous_start: item.start_date,
            previous_end: item.end_date,
        }))
    }
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(
        RichText::new(text)
            .size(10.0)
            .color(theme::TEXT_DIM)
            .strong(),
    );
}

/// Details of the selected item plus start/end pickers when it is editable.
pub fn show_item_editor(
    item: &TimelineItem,
    draft: &mut DateDraft,
    enabled: bool,
    ui: &mut Ui,
) -> ItemEditorAction {
    let mut action = ItemEditorAction::None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(theme::type_icon(item.item_type))
                .size(13.0)
                .color(theme::type_color(item.item_type)),
        );
        ui.add(
            egui::Label::new(
                RichText::new(&item.name)
                    .strong()
                    .size(13.0)
                    .color(theme::TEXT_PRIMARY),
            )
            .truncate(),
        );
    });
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(5.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        egui::Grid::new("item_details")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                field_label(ui, "Type");
                ui.label(item.item_type.label());
                ui.end_row();

                field_label(ui, "Status");
                ui.label(
                    RichText::new(&item.status)
                        .color(theme::status_color(&item.status, item.item_type)),
                );
                ui.end_row();

                if let Some(priority) = item.shown_priority() {
                    field_label(ui, "Priority");
                    ui.label(RichText::new(priority).color(theme::priority_color(priority)));
                    ui.end_row();
                }

                if let Some(assignee) = &item.assignee {
                    field_label(ui, "Assignee");
                    ui.label(format!("{} ({})", assignee.username, assignee.initials));
                    ui.end_row();
                }

                if !item.dependencies.is_empty() {
                    field_label(ui, "Depends on");
                    ui.label(item.dependencies.join(", "));
                    ui.end_row();
                }
            });

        field_label(ui, "Progress");
        ui.add(
            egui::ProgressBar::new(item.progress as f32 / 100.0)
                .desired_width(ui.available_width())
                .fill(theme::status_color(&item.status, item.item_type))
                .rounding(egui::Rounding::same(3.0))
                .text(format!("{}%", item.progress)),
        );

        ui.add_space(2.0);

        if !item.editable {
            field_label(ui, "Dates");
            ui.label(item.date_range_label());
            ui.label(RichText::new("Read-only item").color(theme::TEXT_DIM).italics());
            return;
        }

        ui.add_enabled_ui(enabled, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    field_label(ui, "Start");
                    ui.add(egui_extras::DatePickerButton::new(&mut draft.start).id_salt("dp_item_start"));
                });
                ui.add_space(8.0);
                ui.vertical(|ui| {
                    field_label(ui, "End");
                    ui.add(egui_extras::DatePickerButton::new(&mut draft.end).id_salt("dp_item_end"));
                });
            });

            if draft.end < draft.start {
                ui.label(
                    RichText::new("End is before start")
                        .size(10.0)
                        .color(theme::ERROR_TEXT),
                );
            }

            ui.horizontal(|ui| {
                let apply = egui::Button::new(RichText::new("Apply dates").color(egui::Color32::WHITE))
                    .fill(theme::ACCENT);
                if ui.add(apply).clicked() {
                    action = match draft.to_commit(item) {
                        Ok(Some(commit)) => ItemEditorAction::Commit(commit),
                        Ok(None) => ItemEditorAction::None,
                        Err(msg) => ItemEditorAction::Invalid(msg),
                    };
                }
                if ui.button("Reset").clicked() {
                    if let Some(start) = item.start_date.or(item.end_date) {
                        draft.start = start;
                    }
                    if let Some(end) = item.end_date.or(item.start_date) {
                        draft.end = end;
                    }
                }
            });
        });
    });

    action
}
