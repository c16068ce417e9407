use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use egui::{Color32, Pos2, Rect, Response, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::layout::LABEL_MIN_WIDTH;
use crate::model::{
    BarGeometry, BarRect, DateCommit, DragMode, GestureOutcome, InteractionController,
    Normalized, TimelineItem, TimelineWindow, Zoom,
};
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_GAP: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;
const GRIP_REACH: f32 = HANDLE_WIDTH * 0.5 + 3.0;

/// What the chart asks the owning app to do after this frame.
#[derive(Debug, Default)]
pub struct ChartInteraction {
    pub select: Option<String>,
    pub clear_selection: bool,
    /// A finished drag or resize to persist.
    pub commit: Option<DateCommit>,
    pub zoomed: bool,
}

/// Render the timeline (right panel): month header, rows, bars and the
/// drag/resize handles. `interactive` is false while a request is pending.
pub fn show_timeline_chart(
    normalized: &Normalized<'_>,
    controller: &mut InteractionController,
    zoom: &mut Zoom,
    selected: Option<&str>,
    interactive: bool,
    today: NaiveDate,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();

    // Ctrl+scroll (or pinch) zooms; never mid-gesture, the gesture's pixel
    // origin would no longer match the scale.
    let (scroll_y, zoom_delta, ctrl) =
        ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta(), i.modifiers.ctrl));
    if ui.rect_contains_pointer(ui.max_rect()) && !controller.is_dragging() {
        if zoom_delta > 1.0 || (ctrl && scroll_y > 0.0) {
            zoom.zoom_in();
            interaction.zoomed = true;
        } else if zoom_delta < 1.0 || (ctrl && scroll_y < 0.0) {
            zoom.zoom_out();
            interaction.zoomed = true;
        }
    }

    let window = &normalized.window;
    let rows = &normalized.visible;
    let ppd = zoom.pixels_per_day();
    let available = ui.available_size();
    let chart_width = window.total_width(ppd).max(available.x);
    let chart_height = HEADER_HEIGHT + rows.len() as f32 * (ROW_HEIGHT + ROW_GAP) + 40.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let canvas_height = response.rect.height();
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_row_stripes(&painter, origin, rows.len(), chart_width);
            draw_timeline_header(&painter, origin, window, ppd, chart_width, canvas_height);

            if rows.is_empty() {
                painter.text(
                    Pos2::new(origin.x + 16.0, origin.y + HEADER_HEIGHT + 24.0),
                    egui::Align2::LEFT_CENTER,
                    "No timeline items",
                    theme::font_bar(),
                    theme::TEXT_DIM,
                );
            }

            // Geometry first so dependency arrows can be drawn under the bars.
            let bars: Vec<(BarGeometry, BarRect)> = rows
                .iter()
                .map(|item| {
                    let geo = BarGeometry::for_item(item, window, ppd);
                    let rect = controller
                        .visual_for(&item.id)
                        .unwrap_or_else(|| BarRect::from(geo));
                    (geo, rect)
                })
                .collect();
            let row_of: HashMap<&str, usize> = rows
                .iter()
                .enumerate()
                .map(|(i, item)| (item.id.as_str(), i))
                .collect();

            draw_dependencies(&painter, origin, rows, &bars, &row_of);
            draw_today_line(&painter, origin, window, ppd, today, canvas_height);

            for (i, item) in rows.iter().enumerate() {
                let (geo, rect) = bars[i];
                let bar_rect = bar_screen_rect(origin, rect, row_y(origin, i));
                let is_selected = selected == Some(item.id.as_str());
                let show_label = if controller.visual_for(&item.id).is_some() {
                    rect.width > LABEL_MIN_WIDTH
                } else {
                    geo.show_label
                };
                let progress_width = if geo.width > 0.0 {
                    geo.progress_width * rect.width / geo.width
                } else {
                    0.0
                };
                draw_bar(&painter, item, bar_rect, progress_width, show_label, is_selected);
                if controller.visual_for(&item.id).is_some() {
                    draw_drag_preview(&painter, window, rect, bar_rect, ppd);
                }

                let editable = interactive && item.editable;
                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("timeline-bar", &item.id)),
                    if editable { Sense::click_and_drag() } else { Sense::click() },
                );

                let mut grips: Vec<(DragMode, Response)> = Vec::with_capacity(3);
                if editable {
                    let (left_handle_rect, right_handle_rect) = grip_rects(bar_rect);
                    grips.push((DragMode::Move, bar_response.clone()));
                    grips.push((
                        DragMode::ResizeStart,
                        ui.interact(
                            left_handle_rect,
                            ui.make_persistent_id(("timeline-resize-left", &item.id)),
                            Sense::drag(),
                        ),
                    ));
                    grips.push((
                        DragMode::ResizeEnd,
                        ui.interact(
                            right_handle_rect,
                            ui.make_persistent_id(("timeline-resize-right", &item.id)),
                            Sense::drag(),
                        ),
                    ));
                }

                if bar_response.clicked() {
                    interaction.select = Some(item.id.clone());
                    consumed_click = true;
                }

                for (mode, grip) in &grips {
                    if grip.drag_started() {
                        if let Some(pos) = grip.interact_pointer_pos() {
                            if controller.pointer_down(item, window, *mode, pos.x, ppd) {
                                interaction.select = Some(item.id.clone());
                                consumed_click = true;
                            }
                        }
                    }

                    if !owns_gesture(controller, item, *mode) {
                        continue;
                    }

                    if grip.dragged() {
                        ui.ctx().set_cursor_icon(match mode {
                            DragMode::Move => egui::CursorIcon::Grabbing,
                            _ => egui::CursorIcon::ResizeHorizontal,
                        });
                        if let Some(pos) = grip.interact_pointer_pos() {
                            controller.pointer_move(pos.x);
                        }
                    }

                    if grip.drag_stopped() {
                        let x = grip
                            .interact_pointer_pos()
                            .map(|p| p.x)
                            .or_else(|| controller.last_pointer_x());
                        if let Some(x) = x {
                            apply_outcome(controller.pointer_up(x), &mut interaction);
                        }
                    }
                }

                let hovered = grips.iter().any(|(_, r)| r.hovered()) || bar_response.hovered();
                if editable && (is_selected || hovered) {
                    let handle_hovered = grips
                        .iter()
                        .any(|(m, r)| *m != DragMode::Move && r.hovered());
                    if handle_hovered {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                    } else if bar_response.hovered() && !controller.is_dragging() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                    }
                    draw_handles(&painter, bar_rect);
                }

                if hovered && !controller.is_dragging() {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("timeline-tip", &item.id)),
                        |ui| item_tooltip(item, ui),
                    );
                }
            }

            // The bar under the pointer can vanish mid-drag (collapse, refresh);
            // finish the gesture on release anyway.
            if controller.is_dragging() && !ui.input(|i| i.pointer.any_down()) {
                if let Some(x) = controller.last_pointer_x() {
                    apply_outcome(controller.pointer_up(x), &mut interaction);
                }
            }

            if response.clicked() && !consumed_click {
                interaction.clear_selection = true;
            }
        });

    interaction
}

fn owns_gesture(controller: &InteractionController, item: &TimelineItem, mode: DragMode) -> bool {
    controller
        .active()
        .is_some_and(|g| g.item_id == item.id && g.mode == mode)
}

fn apply_outcome(outcome: GestureOutcome, interaction: &mut ChartInteraction) {
    match outcome {
        GestureOutcome::Ignored => {}
        GestureOutcome::Click { item_id } => {
            interaction.select = Some(item_id);
        }
        GestureOutcome::Commit(commit) => {
            interaction.select = Some(commit.item_id.clone());
            interaction.commit = Some(commit);
        }
    }
}

fn row_y(origin: Pos2, row: usize) -> f32 {
    origin.y + HEADER_HEIGHT + row as f32 * (ROW_HEIGHT + ROW_GAP) + ROW_GAP
}

fn bar_screen_rect(origin: Pos2, rect: BarRect, y: f32) -> Rect {
    let inset = theme::BAR_INSET;
    Rect::from_min_size(
        Pos2::new(origin.x + rect.offset, y + inset),
        Vec2::new(rect.width, ROW_HEIGHT - inset * 2.0),
    )
}

fn draw_row_stripes(painter: &egui::Painter, origin: Pos2, rows: usize, width: f32) {
    for i in 0..rows {
        let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_GAP);
        let row_bg = if i % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_DARK
        };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, ROW_HEIGHT + ROW_GAP)),
            0.0,
            row_bg,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + ROW_HEIGHT + ROW_GAP),
                Pos2::new(origin.x + width, y + ROW_HEIGHT + ROW_GAP),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    origin: Pos2,
    window: &TimelineWindow,
    pixels_per_day: f32,
    width: f32,
    height: f32,
) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    // Day grid and weekend shading
    let days = window.total_days();
    for d in 0..days {
        let date = window.start + Duration::days(d);
        let x = origin.x + d as f32 * pixels_per_day;
        let is_weekend = date.weekday().num_days_from_monday() >= 5;

        if is_weekend {
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(x, origin.y + HEADER_HEIGHT),
                    Vec2::new(pixels_per_day, height - HEADER_HEIGHT),
                ),
                0.0,
                Color32::from_black_alpha(18),
            );
        }

        let labelled = pixels_per_day >= 20.0 || date.weekday().num_days_from_monday() == 0;
        if labelled {
            painter.line_segment(
                [
                    Pos2::new(x, origin.y + HEADER_HEIGHT),
                    Pos2::new(x, origin.y + height),
                ],
                Stroke::new(0.5, theme::GRID_LINE),
            );
            painter.text(
                Pos2::new(x + 3.0, origin.y + 32.0),
                egui::Align2::LEFT_CENTER,
                date.format("%d").to_string(),
                theme::font_sub(),
                if is_weekend {
                    theme::TEXT_DIM
                } else {
                    theme::TEXT_SECONDARY
                },
            );
        }
    }

    // Month bands
    for band in &window.bands {
        let x = origin.x + window.date_to_x(band.first_day, pixels_per_day);
        let band_width = band.day_count as f32 * pixels_per_day;

        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, origin.y + height)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        if band_width > LABEL_MIN_WIDTH {
            let clipped = painter.with_clip_rect(Rect::from_min_size(
                Pos2::new(x, origin.y),
                Vec2::new(band_width, HEADER_HEIGHT),
            ));
            clipped.text(
                Pos2::new(x + 5.0, origin.y + 12.0),
                egui::Align2::LEFT_CENTER,
                &band.label,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
        }
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    origin: Pos2,
    window: &TimelineWindow,
    pixels_per_day: f32,
    today: NaiveDate,
    height: f32,
) {
    if window.is_empty() || today < window.start || today > window.end {
        return;
    }
    // middle of today's column
    let x = origin.x + window.date_to_x(today, pixels_per_day) + pixels_per_day * 0.5;

    painter.line_segment(
        [
            Pos2::new(x, origin.y + HEADER_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

/// Elbow arrows from each predecessor's right edge to the dependent's left
/// edge. Only pairs where both rows are visible are drawn.
fn draw_dependencies(
    painter: &egui::Painter,
    origin: Pos2,
    rows: &[&TimelineItem],
    bars: &[(BarGeometry, BarRect)],
    row_of: &HashMap<&str, usize>,
) {
    let stroke = Stroke::new(1.0, theme::DEP_ARROW);
    let center_y = |row: usize| row_y(origin, row) + ROW_HEIGHT / 2.0;

    for (i, item) in rows.iter().enumerate() {
        for dep in &item.dependencies {
            let Some(&j) = row_of.get(dep.as_str()) else {
                continue;
            };
            let from = Pos2::new(origin.x + bars[j].1.right(), center_y(j));
            let to = Pos2::new(origin.x + bars[i].1.offset, center_y(i));
            let elbow_x = from.x + 8.0;

            painter.line_segment([from, Pos2::new(elbow_x, from.y)], stroke);
            painter.line_segment([Pos2::new(elbow_x, from.y), Pos2::new(elbow_x, to.y)], stroke);
            painter.line_segment([Pos2::new(elbow_x, to.y), to], stroke);

            let head = 4.0;
            painter.add(egui::Shape::convex_polygon(
                vec![
                    to,
                    Pos2::new(to.x - head * 1.5, to.y - head),
                    Pos2::new(to.x - head * 1.5, to.y + head),
                ],
                theme::DEP_ARROW,
                Stroke::NONE,
            ));
        }
    }
}

fn draw_bar(
    painter: &egui::Painter,
    item: &TimelineItem,
    bar_rect: Rect,
    progress_width: f32,
    show_label: bool,
    is_selected: bool,
) {
    let color = theme::status_color(&item.status, item.item_type);
    let rounding = Rounding::same(theme::BAR_ROUNDING.min(bar_rect.height() / 2.0));

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );

    // Remaining part in a lighter tint, completed part in the full color
    painter.rect_filled(bar_rect, rounding, theme::tint(color));
    if progress_width > 0.0 {
        let progress_rect = Rect::from_min_size(
            bar_rect.min,
            Vec2::new(progress_width.min(bar_rect.width()), bar_rect.height()),
        );
        painter.rect_filled(progress_rect, rounding, color);
    }

    if !item.has_dates() {
        painter.rect_stroke(bar_rect, rounding, Stroke::new(1.0, theme::TEXT_DIM));
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if let Some(priority) = item.shown_priority() {
        painter.circle_filled(
            Pos2::new(bar_rect.right() + 7.0, bar_rect.center().y),
            3.0,
            theme::priority_color(priority),
        );
    }

    // Name on the bar (single line, clipped to bar bounds)
    if show_label {
        let galley = painter.layout_no_wrap(item.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect.shrink(1.0));
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }
}

/// Dates the bar would land on if released now.
fn draw_drag_preview(
    painter: &egui::Painter,
    window: &TimelineWindow,
    rect: BarRect,
    bar_rect: Rect,
    pixels_per_day: f32,
) {
    let start = window.x_to_date(rect.offset, pixels_per_day);
    let end = window.x_to_date(rect.right() - pixels_per_day, pixels_per_day);
    painter.text(
        Pos2::new(bar_rect.left(), bar_rect.top() - 1.0),
        egui::Align2::LEFT_BOTTOM,
        format!("{} → {}", start.format("%b %d"), end.format("%b %d")),
        theme::font_small(),
        theme::TEXT_PRIMARY,
    );
}

/// Hit areas for the start and end resize grips. Each reaches
/// `GRIP_REACH` px outside the bar, and at most a third of the bar's width
/// inside it, so the middle of even a one-day bar still moves the bar.
fn grip_rects(bar_rect: Rect) -> (Rect, Rect) {
    let inner = GRIP_REACH.min(bar_rect.width() / 3.0);
    let left = Rect::from_min_max(
        Pos2::new(bar_rect.left() - GRIP_REACH, bar_rect.top()),
        Pos2::new(bar_rect.left() + inner, bar_rect.bottom()),
    );
    let right = Rect::from_min_max(
        Pos2::new(bar_rect.right() - inner, bar_rect.top()),
        Pos2::new(bar_rect.right() + GRIP_REACH, bar_rect.bottom()),
    );
    (left, right)
}

fn draw_handles(painter: &egui::Painter, bar_rect: Rect) {
    let handle_h = bar_rect.height() * 0.55;
    let handle_y = bar_rect.center().y - handle_h / 2.0;
    let lh = Rect::from_min_size(
        Pos2::new(bar_rect.left() - 1.5, handle_y),
        Vec2::new(4.0, handle_h),
    );
    let rh = Rect::from_min_size(
        Pos2::new(bar_rect.right() - 2.5, handle_y),
        Vec2::new(4.0, handle_h),
    );
    painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
    painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
}

fn item_tooltip(item: &TimelineItem, ui: &mut Ui) {
    ui.strong(&item.name);
    ui.label(format!("{} · {}", item.item_type.label(), item.status));
    ui.label(item.date_range_label());
    ui.label(format!("Progress: {}%", item.progress));
    if let Some(priority) = item.shown_priority() {
        ui.label(format!("Priority: {priority}"));
    }
    if let Some(assignee) = &item.assignee {
        ui.label(format!("Assignee: {} ({})", assignee.username, assignee.initials));
    }
    if !item.editable {
        ui.weak("Read-only");
    }
}
