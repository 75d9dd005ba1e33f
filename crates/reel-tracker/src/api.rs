//! The remote operations the tracker depends on.

use async_trait::async_trait;
use reel_client::{ApiClient, ClientError};
use reel_core::ids::TaskId;
use reel_core::wire::{CancelAck, HistoryPage, StatusPayload, SubmitRequest, SubmitResponse};

/// Render service operations consumed by [`crate::Tracker`].
///
/// [`ApiClient`] is the production implementation; tests script their own.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ClientError>;

    async fn fetch_status(&self, task_id: &TaskId) -> Result<StatusPayload, ClientError>;

    async fn cancel(&self, task_id: &TaskId) -> Result<CancelAck, ClientError>;

    async fn fetch_history(&self, page: u32, limit: u32) -> Result<HistoryPage, ClientError>;
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, ClientError> {
        Self::submit(self, request).await
    }

    async fn fetch_status(&self, task_id: &TaskId) -> Result<StatusPayload, ClientError> {
        Self::fetch_status(self, task_id).await
    }

    async fn cancel(&self, task_id: &TaskId) -> Result<CancelAck, ClientError> {
        Self::cancel(self, task_id).await
    }

    async fn fetch_history(&self, page: u32, limit: u32) -> Result<HistoryPage, ClientError> {
        Self::fetch_history(self, page, limit).await
    }
}
