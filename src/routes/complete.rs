use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

use crate::completion::{complete_by_token, CompletedTask, CompletionError};
use crate::startup::DashboardUrl;
use crate::store::RestTaskStore;

#[derive(serde::Deserialize)]
pub struct Parameters {
    // Option so that a bare `/complete` reaches the handler instead of
    // tripping the extractor's own 400
    token: Option<String>,
}

#[tracing::instrument(name = "Serving a completion link", skip(parameters, store, dashboard_url))]
pub async fn complete_task(
    parameters: web::Query<Parameters>,
    store: web::Data<RestTaskStore>,
    dashboard_url: web::Data<DashboardUrl>,
) -> HttpResponse {
    match complete_by_token(store.get_ref(), parameters.0.token).await {
        Ok(completed) => completed_page(&completed, dashboard_url.get_ref()),
        Err(CompletionError::MissingToken) => HttpResponse::BadRequest()
            .content_type(ContentType::html())
            .body("A completion token is required"),
        Err(CompletionError::NotFoundOrAlreadyDone) => {
            not_found_or_done_page(dashboard_url.get_ref())
        }
        Err(error @ CompletionError::LookupError(_)) => {
            tracing::error!(error.cause_chain = ?error, "Failed to look up the task");
            HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body("Task store error")
        }
        Err(error @ CompletionError::UpdateError(_)) => {
            tracing::error!(error.cause_chain = ?error, "Failed to mark the task as done");
            HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body("Something went wrong while completing the task")
        }
        Err(error @ CompletionError::UnexpectedError(_)) => {
            tracing::error!(error.cause_chain = ?error, "Failed to serve the completion link");
            unexpected_error_page(&error, dashboard_url.get_ref())
        }
    }
}

/// Answers the browser's preflight for cross-origin clicks; the CORS headers
/// themselves land on the response through the app-wide default headers.
pub async fn complete_preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn completed_page(completed: &CompletedTask, dashboard_url: &DashboardUrl) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            r#"<html>
  <body style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
    <h2>✅ All done!</h2>
    <p><strong>{}</strong> has been marked as completed.</p>
    <p>Completed at {}</p>
    <p><a href="{}" style="color: #007bff;">📊 View the dashboard</a></p>
  </body>
</html>"#,
            htmlescape::encode_minimal(&completed.title),
            completed.completed_at.format("%Y-%m-%d %H:%M UTC"),
            dashboard_href(dashboard_url),
        ))
}

fn not_found_or_done_page(dashboard_url: &DashboardUrl) -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type(ContentType::html())
        .body(format!(
            r#"<html>
  <body style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
    <h2>⚠️ Nothing to complete</h2>
    <p>This task has already been completed or the link is not valid.</p>
    <p><a href="{}" style="color: #007bff;">📊 View the dashboard</a></p>
  </body>
</html>"#,
            dashboard_href(dashboard_url),
        ))
}

fn unexpected_error_page(error: &CompletionError, dashboard_url: &DashboardUrl) -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type(ContentType::html())
        .body(format!(
            r#"<html>
  <body style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
    <h2>❌ Something went wrong</h2>
    <p>The task could not be completed: {}</p>
    <p><a href="{}" style="color: #007bff;">📊 View the dashboard</a></p>
  </body>
</html>"#,
            htmlescape::encode_minimal(&error.to_string()),
            dashboard_href(dashboard_url),
        ))
}

fn dashboard_href(dashboard_url: &DashboardUrl) -> &str {
    dashboard_url.0.as_deref().unwrap_or("#")
}
