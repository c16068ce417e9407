use thiserror::Error;

use crate::model::item::ItemRefError;

/// Failure talking to the timeline endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    ItemRef(#[from] ItemRefError),
}

impl ApiError {
    /// True for 401/403, where a new token is the only fix.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == reqwest::StatusCode::UNAUTHORIZED
                    || *status == reqwest::StatusCode::FORBIDDEN
        )
    }
}
