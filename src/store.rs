use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::completion::error_chain_fmt;
use crate::domain::CompletionToken;

pub(crate) mod rest;

pub use rest::RestTaskStore;

/// A task row as the store hands it to us. The store keeps more columns than
/// these (scheduling, assignee, and so on); we only model what completion
/// needs and ignore the rest.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(rename = "hmac_token")]
    pub token: String,
    pub status: TaskStatus,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to reach the task store")]
    Transport(#[from] reqwest::Error),

    #[error("The task store replied with {status}: {body}")]
    ErrorResponse {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Where tasks live. One implementation talks PostgREST, tests keep theirs
/// in memory.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch at most one task carrying `token` with the given status.
    async fn find_by_token_and_status(
        &self,
        token: &CompletionToken,
        status: TaskStatus,
    ) -> Result<Option<Task>, StoreError>;

    /// Move task `id` from `expected` to `new`, recording `at` as both the
    /// completion time and the modification time. Returns the number of rows
    /// that actually transitioned; zero means the task was no longer in
    /// `expected` when the write landed.
    async fn transition_status(
        &self,
        id: i64,
        expected: TaskStatus,
        new: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
