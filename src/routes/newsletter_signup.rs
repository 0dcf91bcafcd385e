use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::messaging::{Message, Queue, QueueError};
use crate::storage::Store;

#[derive(Deserialize, Debug)]
pub struct SignupForm {
    pub email: String,
}

#[derive(thiserror::Error)]
pub enum SignupError {
    #[error("Submitted email address is not valid.")]
    InvalidEmail(String),
    #[error("Failed to store the pending subscription.")]
    StoreError(#[from] sqlx::Error),
    #[error("Failed to enqueue the confirmation email.")]
    EnqueueError(#[from] QueueError),
}

impl std::fmt::Debug for SignupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            SignupError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            // The browser is told to refresh and try again
            SignupError::StoreError(_) => StatusCode::BAD_GATEWAY,
            SignupError::EnqueueError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Create a pending subscription, then enqueue the confirmation email. The
/// two steps are not atomic: a crash in between loses the email, and the
/// visitor recovers by signing up again.
#[tracing::instrument(
    name = "Newsletter signup handler",
    skip(form, store, queue),
    fields(subscriber_email = %form.email)
)]
pub async fn handle_newsletter_signup(
    form: web::Form<SignupForm>,
    store: web::Data<Store>,
    queue: web::Data<Queue>,
) -> Result<HttpResponse, SignupError> {
    let email = SubscriberEmail::parse(form.0.email).map_err(SignupError::InvalidEmail)?;

    let token = store.signup_for_newsletter(&email).await?;

    queue.send(
        Message::new("confirmation_email")
            .with("email", email.as_ref())
            .with("token", token),
    )?;

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, "/newsletter/thanks"))
        .finish())
}

#[tracing::instrument(name = "Newsletter thanks page")]
pub async fn newsletter_thanks_page() -> impl Responder {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(
        r#"<html><body><h1>Thanks for signing up!</h1><p>Check your inbox for a confirmation link.</p></body></html>"#,
    )
}
