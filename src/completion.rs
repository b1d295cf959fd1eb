use chrono::{DateTime, Utc};

use crate::domain::CompletionToken;
use crate::store::{StoreError, TaskStatus, TaskStore};

/// What a successful completion looked like, ready for rendering.
#[derive(Debug, Clone)]
pub struct CompletedTask {
    pub id: i64,
    pub title: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(thiserror::Error)]
pub enum CompletionError {
    #[error("a completion token is required")]
    MissingToken,

    #[error("the token does not match a pending task")]
    NotFoundOrAlreadyDone,

    #[error("Failed to look up the task for the supplied token")]
    LookupError(#[source] StoreError),

    #[error("Failed to mark the task as done")]
    UpdateError(#[source] StoreError),

    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Complete the pending task identified by `token`.
///
/// A token that matches nothing and a token whose task is already done are
/// deliberately indistinguishable in the outcome, so a caller probing the
/// endpoint cannot learn whether a token was ever valid.
#[tracing::instrument(name = "Completing a task by token", skip(store, token))]
pub async fn complete_by_token(
    store: &impl TaskStore,
    token: Option<String>,
) -> Result<CompletedTask, CompletionError> {
    let raw = token.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(CompletionError::MissingToken);
    }
    let token = match CompletionToken::parse(raw) {
        Ok(token) => token,
        Err(error) => {
            // a token we could never have issued cannot match a pending task,
            // no need to ask the store
            tracing::info!("Rejecting an ill-formed token: {}", error);
            return Err(CompletionError::NotFoundOrAlreadyDone);
        }
    };

    let task = store
        .find_by_token_and_status(&token, TaskStatus::Pending)
        .await
        .map_err(CompletionError::LookupError)?
        .ok_or(CompletionError::NotFoundOrAlreadyDone)?;

    let completed_at = Utc::now();
    let affected = store
        .transition_status(task.id, TaskStatus::Pending, TaskStatus::Done, completed_at)
        .await
        .map_err(CompletionError::UpdateError)?;

    if affected == 0 {
        // lost the race, the task moved out of pending between lookup and update
        tracing::info!("Task {} was completed concurrently", task.id);
        return Err(CompletionError::NotFoundOrAlreadyDone);
    }

    tracing::info!("Task completed: {} (id {})", task.title, task.id);
    Ok(CompletedTask {
        id: task.id,
        title: task.title,
        completed_at,
    })
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
