use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, serde::Serialize)]
pub struct Newsletter {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}
