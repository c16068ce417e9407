//! The loaded timeline and the local edits layered on top of it.

use chrono::NaiveDate;
use tracing::debug;

use crate::api::{ProjectSummary, TimelineResponse};
use crate::model::{DateCommit, ExpansionState, TimelineItem};

/// Items of the current project as last fetched, plus expansion state and
/// optimistic date edits that have not been confirmed yet.
#[derive(Debug, Default)]
pub struct TimelineState {
    pub project: Option<ProjectSummary>,
    pub items: Vec<TimelineItem>,
    pub total_items: usize,
    pub expansion: ExpansionState,
    in_flight: Vec<DateCommit>,
}

impl TimelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fresh server response. Expansion resets
    /// to its default and pending edits are forgotten.
    pub fn replace(&mut self, response: TimelineResponse) {
        self.expansion = ExpansionState::for_items(&response.items);
        self.total_items = response.total_items.max(response.items.len());
        self.items = response.items;
        self.project = Some(response.project);
        self.in_flight.clear();
    }

    pub fn project_name(&self) -> &str {
        self.project.as_ref().map(|p| p.name.as_str()).unwrap_or("No project")
    }

    pub fn find(&self, id: &str) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Write the committed dates into the local item before the server
    /// confirms them. Returns `false` if the item is no longer present.
    pub fn apply_optimistic(&mut self, commit: &DateCommit) -> bool {
        if !self.set_dates(&commit.item_id, Some(commit.start), Some(commit.end)) {
            return false;
        }
        self.in_flight.push(commit.clone());
        true
    }

    /// The server accepted the change.
    pub fn confirm(&mut self, commit: &DateCommit) {
        self.in_flight.retain(|c| c != commit);
    }

    /// The server rejected the change: restore the pre-gesture dates.
    /// Returns the item name when something was restored.
    pub fn rollback(&mut self, commit: &DateCommit) -> Option<String> {
        let position = self.in_flight.iter().position(|c| c == commit)?;
        self.in_flight.remove(position);
        if !self.set_dates(&commit.item_id, commit.previous_start, commit.previous_end) {
            return None;
        }
        debug!(item = %commit.item_id, "rolled back optimistic dates");
        self.find(&commit.item_id).map(|item| item.name.clone())
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.items);
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }

    fn set_dates(&mut self, id: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.start_date = start;
                item.end_date = end;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemType;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loaded() -> TimelineState {
        let response: TimelineResponse = serde_json::from_value(json!({
            "project": {"id": 1, "name": "Website Redesign", "start_date": "2024-01-01", "end_date": "2024-03-31"},
            "items": [
                {"id": "project-1", "type": "project", "name": "Website Redesign",
                 "start_date": "2024-01-01", "end_date": "2024-03-31", "progress": 40.0,
                 "status": "Not Started", "parent_id": null, "level": 0, "editable": true},
                {"id": "task-5", "type": "task", "name": "Wireframes",
                 "start_date": "2024-01-10", "end_date": "2024-01-12", "progress": 100.0,
                 "status": "Done", "priority": "Medium", "parent_id": "project-1",
                 "level": 1, "editable": true, "dependencies": []}
            ],
            "total_items": 2
        }))
        .unwrap();
        let mut state = TimelineState::new();
        state.replace(response);
        state
    }

    fn commit() -> DateCommit {
        DateCommit {
            item_id: "task-5".into(),
            start: date(2024, 1, 15),
            end: date(2024, 1, 17),
            previous_start: Some(date(2024, 1, 10)),
            previous_end: Some(date(2024, 1, 12)),
        }
    }

    #[test]
    fn replace_resets_expansion() {
        let mut state = loaded();
        state.collapse_all();
        assert!(!state.expansion.is_expanded("project-1"));

        let again = loaded();
        state.replace(TimelineResponse {
            project: again.project.clone().unwrap(),
            items: again.items.clone(),
            total_items: 2,
        });
        assert!(state.expansion.is_expanded("project-1"));
        assert_eq!(state.project_name(), "Website Redesign");
    }

    #[test]
    fn failed_update_rolls_back() {
        let mut state = loaded();
        assert!(state.apply_optimistic(&commit()));
        assert_eq!(state.find("task-5").unwrap().start_date, Some(date(2024, 1, 15)));
        assert_eq!(state.in_flight.len(), 1);

        assert_eq!(state.rollback(&commit()).as_deref(), Some("Wireframes"));
        let item = state.find("task-5").unwrap();
        assert_eq!((item.start_date, item.end_date), (Some(date(2024, 1, 10)), Some(date(2024, 1, 12))));
        assert!(state.in_flight.is_empty());
    }

    #[test]
    fn confirmed_update_is_not_rolled_back() {
        let mut state = loaded();
        state.apply_optimistic(&commit());
        state.confirm(&commit());
        assert_eq!(state.rollback(&commit()), None);
        assert_eq!(state.find("task-5").unwrap().end_date, Some(date(2024, 1, 17)));
    }

    #[test]
    fn commit_for_missing_item_is_rejected() {
        let mut state = loaded();
        let mut stale = commit();
        stale.item_id = "task-99".into();
        assert!(!state.apply_optimistic(&stale));
        assert!(state.in_flight.is_empty());
        assert_eq!(state.find("task-5").map(|i| i.item_type), Some(ItemType::Task));
    }
}
