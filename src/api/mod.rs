pub mod client;
pub mod error;
pub mod types;

pub use client::{TimelineApi, TimelineClient};
pub use error::ApiError;
pub use types::{ProjectSummary, TimelineResponse, UpdateItemRequest, UpdateItemResponse};
