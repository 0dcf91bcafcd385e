use actix_web::{web, HttpResponse, ResponseError};
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::storage::Store;

#[derive(Deserialize, Debug)]
pub struct NewslettersQuery {
    pub id: Option<String>,
}

#[derive(thiserror::Error)]
pub enum GetNewslettersError {
    #[error("Newsletter not found.")]
    NotFound,
    #[error("Failed to get newsletters from the database.")]
    StoreError(#[from] sqlx::Error),
}

impl std::fmt::Debug for GetNewslettersError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for GetNewslettersError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetNewslettersError::NotFound => StatusCode::NOT_FOUND,
            GetNewslettersError::StoreError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Read path: one newsletter by id, or all of them newest first. An id that
/// is not a UUID is a not-found outcome before storage is ever queried.
#[tracing::instrument(name = "Get newsletters handler", skip(store))]
pub async fn handle_get_newsletters(
    query: web::Query<NewslettersQuery>,
    store: web::Data<Store>,
) -> Result<HttpResponse, GetNewslettersError> {
    match &query.id {
        Some(raw_id) => {
            let id = Uuid::parse_str(raw_id).map_err(|_| GetNewslettersError::NotFound)?;
            let newsletter = store
                .get_newsletter(id)
                .await?
                .ok_or(GetNewslettersError::NotFound)?;

            Ok(HttpResponse::Ok().json(newsletter))
        }
        None => {
            let newsletters = store.get_newsletters().await?;

            Ok(HttpResponse::Ok().json(newsletters))
        }
    }
}
