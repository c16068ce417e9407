//! Pointer gesture state machine for moving and resizing bars.
//!
//! The controller is framework-agnostic: the chart feeds it pointer x
//! positions, it answers with the visual bar position during the drag and
//! with a [`GestureOutcome`] on release. Dates are only touched on release.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use super::item::{ItemRef, ItemRefError, TimelineItem};
use super::layout::{one_day_width, BarGeometry};
use super::window::{days_between, TimelineWindow};

/// Which part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl DragMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DragMode::Move => "move",
            DragMode::ResizeStart => "resize-start",
            DragMode::ResizeEnd => "resize-end",
        }
    }
}

/// Visual offset/width of a bar in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub offset: f32,
    pub width: f32,
}

impl BarRect {
    pub fn right(&self) -> f32 {
        self.offset + self.width
    }
}

impl From<BarGeometry> for BarRect {
    fn from(geo: BarGeometry) -> Self {
        Self {
            offset: geo.offset,
            width: geo.width,
        }
    }
}

/// Snapshot taken on pointer-down; everything the release needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub item_id: String,
    pub mode: DragMode,
    origin_x: f32,
    origin: BarRect,
    origin_start: NaiveDate,
    origin_end: NaiveDate,
    previous_start: Option<NaiveDate>,
    previous_end: Option<NaiveDate>,
    pixels_per_day: f32,
    last_x: f32,
    current: BarRect,
}

impl Gesture {
    /// Bar position for the current pointer displacement.
    fn visual_at(&self, delta_x: f32) -> BarRect {
        let min_width = one_day_width(self.pixels_per_day);
        let o = self.origin;
        match self.mode {
            DragMode::Move => BarRect {
                offset: (o.offset + delta_x).max(0.0),
                width: o.width,
            },
            DragMode::ResizeEnd => BarRect {
                offset: o.offset,
                width: (o.width + delta_x).max(min_width),
            },
            DragMode::ResizeStart => {
                // right edge stays put
                let right = o.right();
                let offset = (o.offset + delta_x).min(right - min_width).max(0.0);
                BarRect {
                    offset,
                    width: (right - offset).max(min_width),
                }
            }
        }
    }

    fn delta_days(&self, delta_x: f32) -> i64 {
        if self.pixels_per_day <= 0.0 || !delta_x.is_finite() {
            return 0;
        }
        (delta_x / self.pixels_per_day).round() as i64
    }

    /// New `(start, end)` for a day delta. Resizes never invert the range:
    /// the moving edge stops at the fixed one.
    fn shifted_dates(&self, delta_days: i64) -> Option<(NaiveDate, NaiveDate)> {
        let span = days_between(self.origin_start, self.origin_end).max(0);
        let delta = match self.mode {
            DragMode::Move => delta_days,
            DragMode::ResizeStart => delta_days.min(span),
            DragMode::ResizeEnd => delta_days.max(-span),
        };
        if delta == 0 {
            return None;
        }
        let shift = Duration::days(delta);
        Some(match self.mode {
            DragMode::Move => (self.origin_start + shift, self.origin_end + shift),
            DragMode::ResizeStart => (self.origin_start + shift, self.origin_end),
            DragMode::ResizeEnd => (self.origin_start, self.origin_end + shift),
        })
    }
}

/// Date change produced by a completed gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCommit {
    pub item_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Dates before the gesture, kept so a failed update can be rolled back.
    pub previous_start: Option<NaiveDate>,
    pub previous_end: Option<NaiveDate>,
}

impl DateCommit {
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    pub fn item_ref(&self) -> Result<ItemRef, ItemRefError> {
        ItemRef::parse(&self.item_id)
    }
}

/// What a pointer release amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture was in progress.
    Ignored,
    /// Released within half a day of where it started; the bar snaps back.
    Click { item_id: String },
    Commit(DateCommit),
}

#[derive(Debug, Clone, Default, PartialEq)]
enum GestureState {
    #[default]
    Idle,
    Dragging(Gesture),
}

/// Owns the single in-flight gesture of the timeline.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: GestureState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    pub fn active(&self) -> Option<&Gesture> {
        match &self.state {
            GestureState::Dragging(g) => Some(g),
            GestureState::Idle => None,
        }
    }

    /// Visual override for `item_id` while it is being dragged.
    pub fn visual_for(&self, item_id: &str) -> Option<BarRect> {
        self.active()
            .filter(|g| g.item_id == item_id)
            .map(|g| g.current)
    }

    /// Start a gesture on `item`. Returns `false` when the item is not
    /// editable or another gesture is still live.
    pub fn pointer_down(
        &mut self,
        item: &TimelineItem,
        window: &TimelineWindow,
        mode: DragMode,
        pointer_x: f32,
        pixels_per_day: f32,
    ) -> bool {
        if !item.editable || self.is_dragging() {
            return false;
        }
        let origin = BarRect::from(BarGeometry::for_item(item, window, pixels_per_day));
        debug!(item = %item.id, mode = mode.as_str(), "gesture started");
        self.state = GestureState::Dragging(Gesture {
            item_id: item.id.clone(),
            mode,
            origin_x: pointer_x,
            origin,
            origin_start: item.effective_start(window),
            origin_end: item.effective_end(window),
            previous_start: item.start_date,
            previous_end: item.end_date,
            pixels_per_day,
            last_x: pointer_x,
            current: origin,
        });
        true
    }

    /// Track the pointer. Only the visual bar changes.
    pub fn pointer_move(&mut self, pointer_x: f32) -> Option<BarRect> {
        match &mut self.state {
            GestureState::Dragging(g) => {
                g.last_x = pointer_x;
                g.current = g.visual_at(pointer_x - g.origin_x);
                Some(g.current)
            }
            GestureState::Idle => None,
        }
    }

    /// Finish the gesture and turn the displacement into whole days.
    pub fn pointer_up(&mut self, pointer_x: f32) -> GestureOutcome {
        let gesture = match std::mem::take(&mut self.state) {
            GestureState::Dragging(g) => g,
            GestureState::Idle => return GestureOutcome::Ignored,
        };

        let delta_days = gesture.delta_days(pointer_x - gesture.origin_x);
        match gesture.shifted_dates(delta_days) {
            Some((start, end)) => GestureOutcome::Commit(DateCommit {
                item_id: gesture.item_id,
                start,
                end,
                previous_start: gesture.previous_start,
                previous_end: gesture.previous_end,
            }),
            None => GestureOutcome::Click {
                item_id: gesture.item_id,
            },
        }
    }

    /// Last pointer x seen by the live gesture, for releases that arrive
    /// without a position.
    pub fn last_pointer_x(&self) -> Option<f32> {
        self.active().map(|g| g.last_x)
    }

    /// Drop any live gesture without an outcome, e.g. when the list is
    /// replaced under it.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ItemType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> TimelineWindow {
        TimelineWindow::empty(date(2024, 1, 1))
    }

    fn task(start: NaiveDate, end: NaiveDate) -> TimelineItem {
        TimelineItem::new("task-7", ItemType::Task, "Drag me").with_dates(Some(start), Some(end))
    }

    fn commit(outcome: GestureOutcome) -> DateCommit {
        match outcome {
            GestureOutcome::Commit(c) => c,
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn move_shifts_both_dates() {
        let item = task(date(2024, 2, 1), date(2024, 2, 5));
        let mut ctl = InteractionController::new();
        assert!(ctl.pointer_down(&item, &window(), DragMode::Move, 100.0, 10.0));
        ctl.pointer_move(115.0);
        let c = commit(ctl.pointer_up(131.0));

        assert_eq!(c.item_id, "task-7");
        assert_eq!(c.start_iso(), "2024-02-04");
        assert_eq!(c.end_iso(), "2024-02-08");
        assert_eq!(c.previous_start, Some(date(2024, 2, 1)));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn sub_threshold_drag_is_a_click() {
        let item = task(date(2024, 2, 1), date(2024, 2, 5));
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::Move, 50.0, 20.0);
        ctl.pointer_move(58.0);
        assert_eq!(
            ctl.pointer_up(58.0),
            GestureOutcome::Click { item_id: "task-7".into() }
        );
    }

    #[test]
    fn resize_start_keeps_end_date() {
        let item = task(date(2024, 3, 10), date(2024, 3, 20));
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::ResizeStart, 0.0, 15.0);
        let c = commit(ctl.pointer_up(30.0));
        assert_eq!(c.start, date(2024, 3, 12));
        assert_eq!(c.end, date(2024, 3, 20));
    }

    #[test]
    fn resize_end_keeps_start_date() {
        let item = task(date(2024, 3, 10), date(2024, 3, 20));
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::ResizeEnd, 200.0, 10.0);
        let c = commit(ctl.pointer_up(150.0));
        assert_eq!(c.start, date(2024, 3, 10));
        assert_eq!(c.end, date(2024, 3, 15));
    }

    #[test]
    fn resize_never_inverts_range() {
        let item = task(date(2024, 3, 10), date(2024, 3, 12));
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::ResizeEnd, 200.0, 10.0);
        let c = commit(ctl.pointer_up(0.0));
        assert_eq!((c.start, c.end), (date(2024, 3, 10), date(2024, 3, 10)));

        ctl.pointer_down(&item, &window(), DragMode::ResizeStart, 0.0, 10.0);
        let c = commit(ctl.pointer_up(500.0));
        assert_eq!((c.start, c.end), (date(2024, 3, 12), date(2024, 3, 12)));
    }

    #[test]
    fn resize_on_single_day_item_past_edge_is_a_click() {
        let item = task(date(2024, 3, 10), date(2024, 3, 10));
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::ResizeEnd, 100.0, 10.0);
        assert!(matches!(ctl.pointer_up(40.0), GestureOutcome::Click { .. }));
    }

    #[test]
    fn visual_updates_follow_mode() {
        // offset 20, width 30 at 10 px/day
        let item = task(date(2024, 1, 3), date(2024, 1, 5));
        let mut ctl = InteractionController::new();

        ctl.pointer_down(&item, &window(), DragMode::Move, 0.0, 10.0);
        assert_eq!(ctl.pointer_move(-50.0), Some(BarRect { offset: 0.0, width: 30.0 }));
        ctl.cancel();

        ctl.pointer_down(&item, &window(), DragMode::ResizeEnd, 0.0, 10.0);
        assert_eq!(ctl.pointer_move(-100.0), Some(BarRect { offset: 20.0, width: 10.0 }));
        assert_eq!(ctl.pointer_move(25.0), Some(BarRect { offset: 20.0, width: 55.0 }));
        ctl.cancel();

        ctl.pointer_down(&item, &window(), DragMode::ResizeStart, 0.0, 10.0);
        let rect = ctl.pointer_move(10.0).unwrap();
        assert_eq!(rect, BarRect { offset: 30.0, width: 20.0 });
        assert_eq!(rect.right(), 50.0);
        let rect = ctl.pointer_move(100.0).unwrap();
        assert_eq!(rect, BarRect { offset: 40.0, width: 10.0 });
        let rect = ctl.pointer_move(-100.0).unwrap();
        assert_eq!(rect, BarRect { offset: 0.0, width: 50.0 });
        assert_eq!(ctl.visual_for("task-7"), Some(rect));
        assert_eq!(ctl.last_pointer_x(), Some(-100.0));
        assert_eq!(ctl.visual_for("task-8"), None);
    }

    #[test]
    fn read_only_items_do_not_start_gestures() {
        let mut item = task(date(2024, 1, 3), date(2024, 1, 5));
        item.editable = false;
        let mut ctl = InteractionController::new();
        assert!(!ctl.pointer_down(&item, &window(), DragMode::Move, 0.0, 10.0));
        assert_eq!(ctl.pointer_move(30.0), None);
        assert_eq!(ctl.pointer_up(30.0), GestureOutcome::Ignored);
    }

    #[test]
    fn second_pointer_down_is_ignored_while_dragging() {
        let a = task(date(2024, 1, 3), date(2024, 1, 5));
        let mut b = a.clone();
        b.id = "task-8".into();
        let mut ctl = InteractionController::new();
        assert!(ctl.pointer_down(&a, &window(), DragMode::Move, 0.0, 10.0));
        assert!(!ctl.pointer_down(&b, &window(), DragMode::Move, 0.0, 10.0));
        assert_eq!(ctl.active().map(|g| g.item_id.as_str()), Some("task-7"));
    }

    #[test]
    fn undated_item_is_moved_from_window_start() {
        let item = TimelineItem::new("sprint-3", ItemType::Sprint, "Unplanned");
        let mut ctl = InteractionController::new();
        ctl.pointer_down(&item, &window(), DragMode::Move, 0.0, 10.0);
        let c = commit(ctl.pointer_up(40.0));
        assert_eq!((c.start, c.end), (date(2024, 1, 5), date(2024, 1, 5)));
        assert_eq!(c.previous_start, None);
        assert_eq!(
            c.item_ref().unwrap(),
            ItemRef { item_type: ItemType::Sprint, id: 3 }
        );
    }
}
