use std::future::Future;

use crate::domain::subscriber_email::SubscriberEmail;

pub mod email;

pub use email::{confirmation_email, welcome_email};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sends the email carrying the signup confirmation link.
pub trait ConfirmationEmailSender: Send + Sync {
    fn send_newsletter_confirmation_email(
        &self,
        to: &SubscriberEmail,
        token: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Sends the welcome email referencing an already-saved gift.
pub trait WelcomeEmailSender: Send + Sync {
    fn send_newsletter_welcome_email(
        &self,
        to: &SubscriberEmail,
        gift_url: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Creates and durably saves a gift for a newly confirmed subscriber,
/// returning its URL.
pub trait GiftCreator: Send + Sync {
    fn create_and_save_newsletter_gift(
        &self,
        seed: &str,
    ) -> impl Future<Output = Result<String, BoxError>> + Send;
}
