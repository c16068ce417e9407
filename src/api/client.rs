use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use super::types::{ErrorBody, TimelineResponse, UpdateItemRequest, UpdateItemResponse};

/// The two timeline calls the background worker makes.
pub trait TimelineApi: Send {
    /// Server the calls go to, for logging.
    fn base_url(&self) -> &str;

    fn fetch_timeline(&self, project_id: u64) -> Result<TimelineResponse, ApiError>;

    fn update_item(
        &self,
        project_id: u64,
        req: &UpdateItemRequest,
    ) -> Result<UpdateItemResponse, ApiError>;
}

/// Blocking HTTP client for the two timeline endpoints.
///
/// Calls are made from the background worker, never from the UI thread.
pub struct TimelineClient {
    client: reqwest::blocking::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl TimelineClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    pub fn set_auth(&mut self, token: Option<String>) {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(
        &self,
        builder: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match self.auth_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl TimelineApi for TimelineClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/projects/{id}/timeline/`
    fn fetch_timeline(&self, project_id: u64) -> Result<TimelineResponse, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/timeline/"));
        debug!(%url, "fetching timeline");
        let resp = self.authorized(self.client.get(&url)).send()?;
        parse_response(resp)
    }

    /// `POST /api/projects/{id}/update_timeline_item/`
    fn update_item(
        &self,
        project_id: u64,
        req: &UpdateItemRequest,
    ) -> Result<UpdateItemResponse, ApiError> {
        let url = self.url(&format!("/projects/{project_id}/update_timeline_item/"));
        debug!(%url, item_type = req.item_type.as_str(), item_id = req.item_id, "updating timeline item");
        let resp = self.authorized(self.client.post(&url)).json(req).send()?;
        parse_response(resp)
    }
}

