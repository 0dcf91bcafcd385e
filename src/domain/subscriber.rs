use chrono::{DateTime, Utc};

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_status::SubscriberStatus;

/// One row of the newsletter subscriber lifecycle. The token is empty once
/// the subscription has been confirmed.
#[derive(Debug, serde::Serialize)]
pub struct Subscriber {
    pub email: SubscriberEmail,
    pub status: SubscriberStatus,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
