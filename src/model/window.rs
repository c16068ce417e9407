use chrono::{Datelike, Duration, NaiveDate};

use super::item::TimelineItem;

/// Days of padding before the earliest item date.
pub const LEAD_DAYS: i64 = 7;
/// Days of padding after the latest item date.
pub const TRAIL_DAYS: i64 = 14;

/// One month column of the timeline header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBand {
    /// `"Mon YYYY"`, e.g. `"Feb 2024"`.
    pub label: String,
    /// First date of the band that falls inside the window.
    pub first_day: NaiveDate,
    /// Number of days of this month inside the window (inclusive).
    pub day_count: u32,
}

/// The date range the timeline is laid out against, banded by month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineWindow {
    /// The leftmost date (x = 0).
    pub start: NaiveDate,
    /// The last date covered, inclusive.
    pub end: NaiveDate,
    pub bands: Vec<MonthBand>,
}

impl TimelineWindow {
    /// Window used when there is nothing dated to show: the first of the
    /// current month with no bands.
    pub fn empty(today: NaiveDate) -> Self {
        let start = first_of_month(today);
        Self {
            start,
            end: start,
            bands: Vec::new(),
        }
    }

    /// Derive the padded window and month bands from every non-null date in
    /// `items`.
    pub fn from_items(items: &[TimelineItem], today: NaiveDate) -> Self {
        let dates = items
            .iter()
            .flat_map(|item| [item.start_date, item.end_date])
            .flatten();

        let (min, max) = match dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            })
        }) {
            Some(range) => range,
            None => return Self::empty(today),
        };

        let start = min - Duration::days(LEAD_DAYS);
        let end = max + Duration::days(TRAIL_DAYS);
        Self {
            start,
            end,
            bands: month_bands(start, end),
        }
    }

    /// Total days covered by the bands. Zero for an empty window.
    pub fn total_days(&self) -> i64 {
        self.bands.iter().map(|b| b.day_count as i64).sum()
    }

    /// Signed whole days from the window start to `date`.
    pub fn days_from_start(&self, date: NaiveDate) -> i64 {
        days_between(self.start, date)
    }

    /// Convert a date to an x-pixel offset from the window start.
    pub fn date_to_x(&self, date: NaiveDate, pixels_per_day: f32) -> f32 {
        self.days_from_start(date) as f32 * pixels_per_day
    }

    /// Convert an x-pixel offset back to the nearest date.
    pub fn x_to_date(&self, x: f32, pixels_per_day: f32) -> NaiveDate {
        let days = (x / pixels_per_day).round() as i64;
        self.start + Duration::days(days)
    }

    /// Width in pixels of the whole banded range.
    pub fn total_width(&self, pixels_per_day: f32) -> f32 {
        self.total_days() as f32 * pixels_per_day
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .map(|next| next - Duration::days(1))
        .unwrap_or(date)
}

/// Walk month by month across `[start, end]`, clipping the first and last
/// month to the window.
fn month_bands(start: NaiveDate, end: NaiveDate) -> Vec<MonthBand> {
    let mut bands = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let band_end = last_of_month(cursor).min(end);
        bands.push(MonthBand {
            label: cursor.format("%b %Y").to_string(),
            first_day: cursor,
            day_count: (days_between(cursor, band_end) + 1) as u32,
        });
        cursor = band_end + Duration::days(1);
    }
    bands
}
