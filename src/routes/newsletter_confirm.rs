use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::messaging::{Message, Queue, QueueError};
use crate::storage::Store;

#[derive(Deserialize, Debug)]
pub struct ConfirmForm {
    pub token: String,
}

#[derive(thiserror::Error)]
pub enum ConfirmError {
    #[error("The confirmation token does not match any pending signup.")]
    BadToken,
    #[error("Failed to store the confirmation.")]
    StoreError(#[from] sqlx::Error),
    #[error("Failed to enqueue the welcome email.")]
    EnqueueError(#[from] QueueError),
}

impl std::fmt::Debug for ConfirmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for ConfirmError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConfirmError::BadToken => StatusCode::BAD_REQUEST,
            ConfirmError::StoreError(_) => StatusCode::BAD_GATEWAY,
            ConfirmError::EnqueueError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Consume the token, mark the subscription confirmed and enqueue the welcome
/// email. A token that matches nothing (never issued, or already consumed) is
/// a bad request, not a failure.
#[tracing::instrument(
    name = "Newsletter confirmation handler",
    skip(form, store, queue),
    fields(token = %form.token)
)]
pub async fn handle_newsletter_confirm(
    form: web::Form<ConfirmForm>,
    store: web::Data<Store>,
    queue: web::Data<Queue>,
) -> Result<HttpResponse, ConfirmError> {
    let email = store
        .confirm_newsletter_signup(&form.token)
        .await?
        .ok_or(ConfirmError::BadToken)?;

    queue.send(Message::new("welcome_email").with("email", email.as_ref()))?;

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, "/newsletter/confirmed"))
        .finish())
}

#[derive(Deserialize, Debug)]
pub struct ConfirmPageQuery {
    #[serde(default)]
    pub token: String,
}

/// The page behind the emailed confirmation link: a single-button form that
/// posts the token back.
#[tracing::instrument(name = "Newsletter confirm page", skip(query))]
pub async fn newsletter_confirm_page(query: web::Query<ConfirmPageQuery>) -> impl Responder {
    let body = format!(
        r#"<html><body>
            <h1>Confirm your subscription</h1>
            <form action="/newsletter/confirm" method="post">
                <input type="hidden" name="token" value="{}">
                <button type="submit">Confirm</button>
            </form>
        </body></html>"#,
        html_escape(&query.token)
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

#[tracing::instrument(name = "Newsletter confirmed page")]
pub async fn newsletter_confirmed_page() -> impl Responder {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(
        r#"<html><body><h1>Subscription confirmed!</h1><p>Your welcome email is on its way.</p></body></html>"#,
    )
}

// Tokens are alphanumeric when we issue them, but this value comes straight
// from the query string.
fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
