use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::window::TimelineWindow;

/// Kind of row in the timeline. Determines colour and the default
/// branch/leaf shape of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Project,
    Milestone,
    Sprint,
    Task,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Project => "project",
            ItemType::Milestone => "milestone",
            ItemType::Sprint => "sprint",
            ItemType::Task => "task",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemType::Project => "Project",
            ItemType::Milestone => "Milestone",
            ItemType::Sprint => "Sprint",
            ItemType::Task => "Task",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "project" => Some(ItemType::Project),
            "milestone" => Some(ItemType::Milestone),
            "sprint" => Some(ItemType::Sprint),
            "task" => Some(ItemType::Task),
            _ => None,
        }
    }
}

/// Display-only reference to the person a task is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: u64,
    pub username: String,
    pub initials: String,
}

/// One renderable row of the timeline: a project, milestone, sprint or task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Composite `"<type>-<numericId>"`, unique within one response.
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Completion percentage in `0..=100`.
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub editable: bool,
    /// Ids of tasks this task depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl TimelineItem {
    pub fn new(id: impl Into<String>, item_type: ItemType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type,
            name: name.into(),
            start_date: None,
            end_date: None,
            progress: 0,
            status: String::new(),
            priority: None,
            assignee: None,
            parent_id: None,
            level: 0,
            editable: true,
            dependencies: Vec::new(),
        }
    }

    /// Builder-style helper used by the sample data and tests.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>, level: u32) -> Self {
        self.parent_id = Some(parent_id.into());
        self.level = level;
        self
    }

    /// Start date used for layout; undated items anchor at the window start.
    pub fn effective_start(&self, window: &TimelineWindow) -> NaiveDate {
        self.start_date.unwrap_or(window.start)
    }

    /// End date used for layout; falls back to the start, then the window start.
    pub fn effective_end(&self, window: &TimelineWindow) -> NaiveDate {
        self.end_date
            .or(self.start_date)
            .unwrap_or(window.start)
    }

    /// Priority to render. Only tasks carry one on screen, whatever the
    /// server sends for other item types.
    pub fn shown_priority(&self) -> Option<&str> {
        match self.item_type {
            ItemType::Task => self.priority.as_deref(),
            _ => None,
        }
    }

    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Human-readable date range for tooltips and the side table.
    pub fn date_range_label(&self) -> String {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unscheduled".to_string())
        };
        format!("{} → {}", fmt(self.start_date), fmt(self.end_date))
    }

    pub fn item_ref(&self) -> Result<ItemRef, ItemRefError> {
        ItemRef::parse(&self.id)
    }
}

/// Server progress values are floats rounded to one decimal; the timeline
/// only needs whole percentages.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<f64> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemRefError {
    #[error("item id '{0}' is not of the form <type>-<number>")]
    Malformed(String),
    #[error("item id '{0}' has an unknown type prefix")]
    UnknownType(String),
}

/// The `(type, numeric id)` pair the update endpoint addresses items by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub id: u64,
}

impl ItemRef {
    /// Split a composite id on its first `-`.
    pub fn parse(composite: &str) -> Result<Self, ItemRefError> {
        let (prefix, number) = composite
            .split_once('-')
            .ok_or_else(|| ItemRefError::Malformed(composite.to_string()))?;
        let item_type = ItemType::from_prefix(prefix)
            .ok_or_else(|| ItemRefError::UnknownType(composite.to_string()))?;
        let id = number
            .parse::<u64>()
            .map_err(|_| ItemRefError::Malformed(composite.to_string()))?;
        Ok(Self { item_type, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_composite_ids() {
        assert_eq!(
            ItemRef::parse("task-42").unwrap(),
            ItemRef { item_type: ItemType::Task, id: 42 }
        );
        assert_eq!(
            ItemRef::parse("milestone-7").unwrap(),
            ItemRef { item_type: ItemType::Milestone, id: 7 }
        );
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(ItemRef::parse("bogus"), Err(ItemRefError::Malformed(_))));
        assert!(matches!(ItemRef::parse("task-x1"), Err(ItemRefError::Malformed(_))));
        assert!(matches!(ItemRef::parse("epic-3"), Err(ItemRefError::UnknownType(_))));
    }

    #[test]
    fn deserializes_server_item() {
        let item: TimelineItem = serde_json::from_value(json!({
            "id": "task-12",
            "type": "task",
            "name": "Implement login",
            "start_date": "2024-02-01",
            "end_date": "2024-02-05",
            "progress": 50,
            "status": "In Progress",
            "priority": "High",
            "assignee": {"id": 3, "username": "jane_smith", "initials": "JS"},
            "parent_id": "sprint-4",
            "level": 3,
            "dependencies": ["task-11"],
            "editable": true
        }))
        .unwrap();

        assert_eq!(item.item_type, ItemType::Task);
        assert_eq!(item.start_date, Some(date(2024, 2, 1)));
        assert_eq!(item.progress, 50);
        assert_eq!(item.parent_id.as_deref(), Some("sprint-4"));
        assert_eq!(item.assignee.unwrap().initials, "JS");
        assert_eq!(item.dependencies, vec!["task-11".to_string()]);
    }

    #[test]
    fn progress_is_rounded_and_clamped() {
        let base = |progress: serde_json::Value| {
            serde_json::from_value::<TimelineItem>(json!({
                "id": "project-1",
                "type": "project",
                "name": "P",
                "start_date": null,
                "end_date": null,
                "progress": progress,
                "status": "Not Started",
                "parent_id": null,
                "level": 0,
                "editable": true
            }))
            .unwrap()
            .progress
        };
        assert_eq!(base(json!(33.3)), 33);
        assert_eq!(base(json!(150)), 100);
        assert_eq!(base(json!(-4)), 0);
        assert_eq!(base(json!(null)), 0);
    }

    #[test]
    fn effective_dates_fall_back_to_window_start() {
        let window = TimelineWindow::empty(date(2024, 1, 1));
        let undated = TimelineItem::new("task-1", ItemType::Task, "Undated");
        assert_eq!(undated.effective_start(&window), date(2024, 1, 1));
        assert_eq!(undated.effective_end(&window), date(2024, 1, 1));

        let open_ended = TimelineItem::new("task-2", ItemType::Task, "Open")
            .with_dates(Some(date(2024, 1, 9)), None);
        assert_eq!(open_ended.effective_end(&window), date(2024, 1, 9));
    }

    #[test]
    fn only_tasks_show_a_priority() {
        let mut task = TimelineItem::new("task-1", ItemType::Task, "Build");
        assert_eq!(task.shown_priority(), None);
        task.priority = Some("High".into());
        assert_eq!(task.shown_priority(), Some("High"));

        for item_type in [ItemType::Project, ItemType::Milestone, ItemType::Sprint] {
            let mut item = TimelineItem::new("x-1", item_type, "Other");
            item.priority = Some("High".into());
            assert_eq!(item.shown_priority(), None, "{item_type:?}");
        }
    }
}
