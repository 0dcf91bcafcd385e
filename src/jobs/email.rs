use std::sync::Arc;

use crate::jobs::{ConfirmationEmailSender, GiftCreator, WelcomeEmailSender};
use crate::messaging::{JobError, JobRegistry, Message};

use crate::domain::subscriber_email::SubscriberEmail;

/// Register the `confirmation_email` job: send a signup confirmation link to
/// a would-be subscriber.
pub fn confirmation_email<S>(registry: &mut JobRegistry, sender: Arc<S>)
where
    S: ConfirmationEmailSender + 'static,
{
    registry.register("confirmation_email", move |message: Message| {
        let sender = sender.clone();

        async move {
            let to = message.get("email").ok_or(JobError::MissingField("email"))?;
            let token = message.get("token").ok_or(JobError::MissingField("token"))?;

            // Messages cross a trust boundary, so the address is re-validated
            let to = parse_email(to)?;

            sender
                .send_newsletter_confirmation_email(&to, token)
                .await
                .map_err(JobError::Failed)?;

            Ok(())
        }
    });
}

/// Register the `welcome_email` job: create a gift for a freshly confirmed
/// subscriber, then send the welcome email referencing it. The gift must be
/// saved before the email goes out; a gift failure means no email at all.
pub fn welcome_email<S, G>(registry: &mut JobRegistry, sender: Arc<S>, gifts: Arc<G>)
where
    S: WelcomeEmailSender + 'static,
    G: GiftCreator + 'static,
{
    registry.register("welcome_email", move |message: Message| {
        let sender = sender.clone();
        let gifts = gifts.clone();

        async move {
            let to = message.get("email").ok_or(JobError::MissingField("email"))?;
            let to = parse_email(to)?;

            let gift_url = gifts
                .create_and_save_newsletter_gift(to.local_part())
                .await
                .map_err(JobError::Failed)?;

            sender
                .send_newsletter_welcome_email(&to, &gift_url)
                .await
                .map_err(JobError::Failed)?;

            Ok(())
        }
    });
}

fn parse_email(raw: &str) -> Result<SubscriberEmail, JobError> {
    SubscriberEmail::parse(raw.to_string()).map_err(|reason| JobError::InvalidField {
        field: "email",
        reason,
    })
}
