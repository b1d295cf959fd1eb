use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::domain::CompletionToken;
use crate::store::{StoreError, Task, TaskStatus, TaskStore};

/// Task store backed by a PostgREST endpoint, Supabase in production.
///
/// Every request authenticates with the service role key, sent both as the
/// `apikey` header and as a bearer token, which is what PostgREST expects.
#[derive(Clone)]
pub struct RestTaskStore {
    http_client: Client,
    base_url: String,
    service_role_key: Secret<String>,
}

impl RestTaskStore {
    pub fn new(
        base_url: String,
        service_role_key: Secret<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            base_url,
            service_role_key,
        }
    }

    fn tasks_endpoint(&self) -> String {
        format!("{}/rest/v1/tasks", self.base_url)
    }

    async fn error_response(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StoreError::ErrorResponse { status, body }
    }
}

#[derive(serde::Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
    last_completed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait::async_trait]
impl TaskStore for RestTaskStore {
    #[tracing::instrument(name = "Looking up a task in the store", skip(self, token))]
    async fn find_by_token_and_status(
        &self,
        token: &CompletionToken,
        status: TaskStatus,
    ) -> Result<Option<Task>, StoreError> {
        let token_filter = format!("eq.{}", token.as_ref());
        let status_filter = format!("eq.{}", status.as_str());
        let response = self
            .http_client
            .get(self.tasks_endpoint())
            .header("apikey", self.service_role_key.expose_secret())
            .bearer_auth(self.service_role_key.expose_secret())
            .query(&[
                ("select", "*"),
                ("hmac_token", token_filter.as_str()),
                ("status", status_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_response(response).await);
        }
        let tasks = response.json::<Vec<Task>>().await?;
        Ok(tasks.into_iter().next())
    }

    #[tracing::instrument(name = "Transitioning a task in the store", skip(self))]
    async fn transition_status(
        &self,
        id: i64,
        expected: TaskStatus,
        new: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let id_filter = format!("eq.{}", id);
        let status_filter = format!("eq.{}", expected.as_str());
        let response = self
            .http_client
            .patch(self.tasks_endpoint())
            .header("apikey", self.service_role_key.expose_secret())
            .bearer_auth(self.service_role_key.expose_secret())
            // ask PostgREST to echo the updated rows back so we can count them
            .header("Prefer", "return=representation")
            .query(&[
                ("id", id_filter.as_str()),
                ("status", status_filter.as_str()),
            ])
            .json(&StatusPatch {
                status: new.as_str(),
                last_completed_at: at,
                updated_at: at,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_response(response).await);
        }
        let updated = response.json::<Vec<Task>>().await?;
        Ok(updated.len() as u64)
    }
}
