//! Background thread that performs API calls so the UI never blocks.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{error, info, warn};

use crate::api::{ApiError, TimelineApi, TimelineResponse, UpdateItemRequest, UpdateItemResponse};
use crate::model::DateCommit;

pub enum Request {
    Fetch { project_id: u64 },
    Update { project_id: u64, commit: DateCommit },
    /// Swap the client after the connection settings changed.
    Reconnect(Box<dyn TimelineApi>),
}

#[derive(Debug)]
pub enum Response {
    Timeline(TimelineResponse),
    FetchFailed(String),
    Updated {
        commit: DateCommit,
        response: UpdateItemResponse,
    },
    UpdateFailed {
        commit: DateCommit,
        error: String,
    },
}

/// Handle to the worker thread. Requests are processed in order.
pub struct Worker {
    tx: Sender<Request>,
    rx: Receiver<Response>,
    pending: usize,
}

impl Worker {
    /// Spawn the worker. `notify` is called after each response is queued,
    /// typically to request a repaint.
    pub fn spawn(client: impl TimelineApi + 'static, notify: impl Fn() + Send + 'static) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel::<Response>();

        thread::spawn(move || {
            let mut client: Box<dyn TimelineApi> = Box::new(client);
            for request in req_rx {
                let response = match request {
                    Request::Reconnect(new_client) => {
                        info!(base_url = new_client.base_url(), "switching API endpoint");
                        client = new_client;
                        continue;
                    }
                    Request::Fetch { project_id } => match client.fetch_timeline(project_id) {
                        Ok(timeline) => {
                            info!(project_id, items = timeline.items.len(), "timeline loaded");
                            Response::Timeline(timeline)
                        }
                        Err(e) => {
                            warn!(project_id, "timeline fetch failed: {e}");
                            Response::FetchFailed(describe(&e))
                        }
                    },
                    Request::Update { project_id, commit } => {
                        match send_update(client.as_ref(), project_id, &commit) {
                            Ok(response) => Response::Updated { commit, response },
                            Err(e) => {
                                warn!(item = %commit.item_id, "timeline update failed: {e}");
                                Response::UpdateFailed {
                                    commit,
                                    error: describe(&e),
                                }
                            }
                        }
                    }
                };
                if resp_tx.send(response).is_err() {
                    break;
                }
                notify();
            }
            info!("worker stopped");
        });

        Self {
            tx: req_tx,
            rx: resp_rx,
            pending: 0,
        }
    }

    pub fn send(&mut self, request: Request) {
        let counts = !matches!(request, Request::Reconnect(_));
        if self.tx.send(request).is_err() {
            error!("worker thread is gone; request dropped");
            return;
        }
        if counts {
            self.pending += 1;
        }
    }

    /// Drain every response that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<Response> {
        let responses: Vec<Response> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(responses.len());
        responses
    }

    /// Whether requests are still outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

fn send_update(
    client: &dyn TimelineApi,
    project_id: u64,
    commit: &DateCommit,
) -> Result<UpdateItemResponse, ApiError> {
    let request = UpdateItemRequest::from_commit(commit)?;
    client.update_item(project_id, &request)
}

fn describe(e: &ApiError) -> String {
    if e.is_auth() {
        format!("{e} (check the access token in Settings)")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// In-memory server: answers from fixtures and records update calls.
    #[derive(Default)]
    struct FakeApi {
        name: &'static str,
        reject_token: bool,
        updates: Arc<Mutex<Vec<UpdateItemRequest>>>,
    }

    impl FakeApi {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                ..Self::default()
            }
        }

        fn unauthorized() -> ApiError {
            ApiError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "Invalid token".into(),
            }
        }
    }

    impl TimelineApi for FakeApi {
        fn base_url(&self) -> &str {
            "http://fake.invalid"
        }

        fn fetch_timeline(&self, project_id: u64) -> Result<TimelineResponse, ApiError> {
            if self.reject_token {
                return Err(Self::unauthorized());
            }
            Ok(serde_json::from_value(json!({
                "project": {"id": project_id, "name": self.name},
                "items": [],
                "total_items": 0
            }))
            .unwrap())
        }

        fn update_item(
            &self,
            _project_id: u64,
            req: &UpdateItemRequest,
        ) -> Result<UpdateItemResponse, ApiError> {
            if self.reject_token {
                return Err(Self::unauthorized());
            }
            self.updates.lock().unwrap().push(req.clone());
            Ok(serde_json::from_value(json!({
                "status": "success",
                "updated": {
                    "id": req.item_id,
                    "type": req.item_type.as_str(),
                    "start_date": req.start_date.map(|d| d.to_string()),
                    "end_date": req.end_date.map(|d| d.to_string())
                }
            }))
            .unwrap())
        }
    }

    fn wait_for(worker: &mut Worker) -> Vec<Response> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let got = worker.poll();
            if !got.is_empty() || Instant::now() > deadline {
                return got;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn commit(item_id: &str) -> DateCommit {
        DateCommit {
            item_id: item_id.into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            previous_start: None,
            previous_end: None,
        }
    }

    #[test]
    fn fetch_returns_the_timeline() {
        let mut worker = Worker::spawn(FakeApi::named("Website"), || {});
        worker.send(Request::Fetch { project_id: 4 });
        assert!(worker.is_busy());

        match wait_for(&mut worker).as_slice() {
            [Response::Timeline(timeline)] => {
                assert_eq!(timeline.project.id, 4);
                assert_eq!(timeline.project.name, "Website");
            }
            other => panic!("unexpected responses: {other:?}"),
        }
        assert!(!worker.is_busy());
    }

    #[test]
    fn rejected_token_points_at_settings() {
        let api = FakeApi {
            reject_token: true,
            ..FakeApi::default()
        };
        let mut worker = Worker::spawn(api, || {});
        worker.send(Request::Fetch { project_id: 1 });

        match wait_for(&mut worker).as_slice() {
            [Response::FetchFailed(message)] => {
                assert!(message.contains("Invalid token"));
                assert!(message.contains("access token in Settings"));
            }
            other => panic!("unexpected responses: {other:?}"),
        }
        assert!(!worker.is_busy());
    }

    #[test]
    fn update_sends_parsed_item_ref() {
        let api = FakeApi::named("Website");
        let updates = Arc::clone(&api.updates);
        let mut worker = Worker::spawn(api, || {});
        worker.send(Request::Update {
            project_id: 1,
            commit: commit("task-7"),
        });

        match wait_for(&mut worker).as_slice() {
            [Response::Updated { commit: done, response }] => {
                assert_eq!(done, &commit("task-7"));
                assert_eq!(response.updated.id, 7);
                assert_eq!(response.updated.start_date.as_deref(), Some("2024-01-01"));
            }
            other => panic!("unexpected responses: {other:?}"),
        }
        let sent = updates.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].item_id, 7);
    }

    #[test]
    fn bad_item_id_fails_before_any_call() {
        let api = FakeApi::named("Website");
        let updates = Arc::clone(&api.updates);
        let mut worker = Worker::spawn(api, || {});
        worker.send(Request::Update {
            project_id: 1,
            commit: commit("not-an-id"),
        });

        match wait_for(&mut worker).as_slice() {
            [Response::UpdateFailed { commit: failed, error }] => {
                assert_eq!(failed, &commit("not-an-id"));
                assert!(error.contains("not-an-id"));
            }
            other => panic!("unexpected responses: {other:?}"),
        }
        assert!(updates.lock().unwrap().is_empty());
    }

    #[test]
    fn reconnect_swaps_the_client_without_a_response() {
        let mut worker = Worker::spawn(FakeApi::named("Old"), || {});
        worker.send(Request::Reconnect(Box::new(FakeApi::named("New"))));
        assert!(!worker.is_busy());
        worker.send(Request::Fetch { project_id: 2 });

        match wait_for(&mut worker).as_slice() {
            [Response::Timeline(timeline)] => assert_eq!(timeline.project.name, "New"),
            other => panic!("unexpected responses: {other:?}"),
        }
    }
}
