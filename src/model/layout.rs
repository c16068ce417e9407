use super::item::TimelineItem;
use super::window::{days_between, TimelineWindow};

/// Horizontal indentation per nesting level, in pixels.
pub const INDENT_UNIT: f32 = 16.0;
/// Bars narrower than this do not get an inline label.
pub const LABEL_MIN_WIDTH: f32 = 40.0;

/// User-adjustable horizontal scale, silently clamped to its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    pixels_per_day: f32,
    pub min: f32,
    pub max: f32,
    pub factor: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            pixels_per_day: 24.0,
            min: 10.0,
            max: 60.0,
            factor: 1.2,
        }
    }
}

impl Zoom {
    pub fn new(pixels_per_day: f32, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let min = min.max(1.0);
        let max = max.max(min);
        let mut zoom = Self {
            pixels_per_day,
            min,
            max,
            ..Self::default()
        };
        zoom.set(pixels_per_day);
        zoom
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.pixels_per_day
    }

    pub fn set(&mut self, pixels_per_day: f32) {
        self.pixels_per_day = if pixels_per_day.is_finite() {
            pixels_per_day.clamp(self.min, self.max)
        } else {
            self.min
        };
    }

    pub fn zoom_in(&mut self) {
        self.set(self.pixels_per_day * self.factor);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.pixels_per_day / self.factor);
    }
}

/// Horizontal geometry of one bar, relative to the window's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub offset: f32,
    pub width: f32,
    /// Width of the completed part, measured from the left edge.
    pub progress_width: f32,
    pub show_label: bool,
}

impl BarGeometry {
    pub fn for_item(item: &TimelineItem, window: &TimelineWindow, pixels_per_day: f32) -> Self {
        let start = item.effective_start(window);
        let end = item.effective_end(window);

        let offset = days_between(window.start, start).max(0) as f32 * pixels_per_day;
        // inclusive on both ends; an inverted range still gets one day
        let days = (days_between(start, end) + 1).max(1);
        let width = days as f32 * pixels_per_day;

        Self {
            offset,
            width,
            progress_width: width * (item.progress.min(100) as f32 / 100.0),
            show_label: width > LABEL_MIN_WIDTH,
        }
    }
}

/// Row indentation for a nesting level.
pub fn indent_for(level: u32) -> f32 {
    level as f32 * INDENT_UNIT
}

/// Width of a single day at the given scale; the minimum bar width.
pub fn one_day_width(pixels_per_day: f32) -> f32 {
    pixels_per_day
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ItemType;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jan_window() -> TimelineWindow {
        TimelineWindow::empty(date(2024, 1, 1))
    }

    #[test]
    fn offset_and_width_are_inclusive_days() {
        let item = TimelineItem::new("task-1", ItemType::Task, "Build")
            .with_dates(Some(date(2024, 1, 3)), Some(date(2024, 1, 5)));
        let geo = BarGeometry::for_item(&item, &jan_window(), 10.0);
        assert_eq!(geo.offset, 20.0);
        assert_eq!(geo.width, 30.0);
        assert_eq!(geo.offset + geo.width, 50.0);
    }

    #[test]
    fn single_day_item_is_one_day_wide() {
        let item = TimelineItem::new("milestone-1", ItemType::Milestone, "Go live")
            .with_dates(Some(date(2024, 1, 10)), Some(date(2024, 1, 10)));
        let geo = BarGeometry::for_item(&item, &jan_window(), 12.0);
        assert_eq!(geo.width, 12.0);
        assert!(!geo.show_label);
    }

    #[test]
    fn undated_item_anchors_at_window_start() {
        let item = TimelineItem::new("sprint-2", ItemType::Sprint, "Backlog");
        let geo = BarGeometry::for_item(&item, &jan_window(), 10.0);
        assert_eq!(geo.offset, 0.0);
        assert_eq!(geo.width, 10.0);
    }

    #[test]
    fn inverted_range_is_clamped_to_one_day() {
        let item = TimelineItem::new("task-2", ItemType::Task, "Oops")
            .with_dates(Some(date(2024, 1, 8)), Some(date(2024, 1, 2)));
        let geo = BarGeometry::for_item(&item, &jan_window(), 10.0);
        assert_eq!(geo.offset, 70.0);
        assert_eq!(geo.width, 10.0);
    }

    #[test]
    fn dates_before_window_clamp_offset_to_zero() {
        let item = TimelineItem::new("task-3", ItemType::Task, "Early")
            .with_dates(Some(date(2023, 12, 25)), Some(date(2024, 1, 2)));
        let geo = BarGeometry::for_item(&item, &jan_window(), 10.0);
        assert_eq!(geo.offset, 0.0);
    }

    #[test]
    fn progress_fill_and_indent() {
        let mut item = TimelineItem::new("task-4", ItemType::Task, "Half")
            .with_dates(Some(date(2024, 1, 1)), Some(date(2024, 1, 10)))
            .with_parent("sprint-1", 3);
        item.progress = 50;
        let geo = BarGeometry::for_item(&item, &jan_window(), 10.0);
        assert_eq!(geo.progress_width, 50.0);
        assert_eq!(indent_for(item.level), 3.0 * INDENT_UNIT);
        assert!(geo.show_label);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut zoom = Zoom::new(100.0, 10.0, 60.0);
        assert_eq!(zoom.pixels_per_day(), 60.0);
        zoom.zoom_in();
        assert_eq!(zoom.pixels_per_day(), 60.0);
        zoom.set(1.0);
        assert_eq!(zoom.pixels_per_day(), 10.0);
        zoom.zoom_out();
        assert_eq!(zoom.pixels_per_day(), 10.0);
        zoom.set(f32::NAN);
        assert_eq!(zoom.pixels_per_day(), 10.0);
    }
}
