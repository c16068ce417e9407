use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::gesture::DateCommit;
use crate::model::item::{ItemRefError, ItemType, TimelineItem};

/// Header information about the project a timeline belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Body of `GET /api/projects/{id}/timeline/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub project: ProjectSummary,
    #[serde(default)]
    pub items: Vec<TimelineItem>,
    #[serde(default)]
    pub total_items: usize,
}

/// Body of `POST /api/projects/{id}/update_timeline_item/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateItemRequest {
    pub item_type: ItemType,
    pub item_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl UpdateItemRequest {
    pub fn from_commit(commit: &DateCommit) -> Result<Self, ItemRefError> {
        let item_ref = commit.item_ref()?;
        Ok(Self {
            item_type: item_ref.item_type,
            item_id: item_ref.id,
            start_date: Some(commit.start),
            end_date: Some(commit.end),
        })
    }
}

/// The dates the server stored. They come back as plain strings and may be
/// `"None"` for unset fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatedItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateItemResponse {
    pub status: String,
    pub updated: UpdatedItem,
}

/// Error payload the API uses for 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_request_from_commit() {
        let commit = DateCommit {
            item_id: "sprint-14".into(),
            start: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 8).unwrap(),
            previous_start: None,
            previous_end: None,
        };
        let req = UpdateItemRequest::from_commit(&commit).unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "item_type": "sprint",
                "item_id": 14,
                "start_date": "2024-02-04",
                "end_date": "2024-02-08"
            })
        );
    }

    #[test]
    fn update_request_omits_absent_dates() {
        let req = UpdateItemRequest {
            item_type: ItemType::Task,
            item_id: 3,
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"item_type": "task", "item_id": 3, "end_date": "2024-05-01"})
        );
    }

    #[test]
    fn update_request_rejects_bad_ids() {
        let commit = DateCommit {
            item_id: "nonsense".into(),
            start: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 2, 8).unwrap(),
            previous_start: None,
            previous_end: None,
        };
        assert!(UpdateItemRequest::from_commit(&commit).is_err());
    }

    #[test]
    fn parses_timeline_response() {
        let resp: TimelineResponse = serde_json::from_value(json!({
            "project": {"id": 1, "name": "Mobile App", "start_date": "2024-01-01", "end_date": null},
            "items": [
                {
                    "id": "project-1", "type": "project", "name": "Mobile App",
                    "start_date": "2024-01-01", "end_date": null, "progress": 12.5,
                    "status": "In Progress", "parent_id": null, "level": 0, "editable": true
                },
                {
                    "id": "milestone-2", "type": "milestone", "name": "MVP",
                    "start_date": null, "end_date": null, "progress": 0.0,
                    "status": "Not Started", "parent_id": "project-1", "level": 1, "editable": true
                }
            ],
            "total_items": 2
        }))
        .unwrap();
        assert_eq!(resp.project.name, "Mobile App");
        assert_eq!(resp.project.end_date, None);
        assert_eq!(resp.items.len(), resp.total_items);
        assert_eq!(resp.items[0].progress, 13);
        assert_eq!(resp.items[1].item_type, ItemType::Milestone);
    }

    #[test]
    fn parses_update_response() {
        let resp: UpdateItemResponse = serde_json::from_value(json!({
            "status": "success",
            "updated": {"id": 9, "type": "task", "start_date": "2024-02-04", "end_date": "None"}
        }))
        .unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.updated.item_type, ItemType::Task);
        assert_eq!(resp.updated.end_date.as_deref(), Some("None"));
    }
}
