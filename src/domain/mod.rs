pub mod newsletter;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_status;
