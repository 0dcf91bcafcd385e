use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::jobs::{ConfirmationEmailSender, WelcomeEmailSender};

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    api_key: Secret<String>,
    // Public base URL of this application, used to build confirmation links
    app_base_url: String,
}

#[derive(serde::Serialize)]
pub struct SendEmailBody {
    personalizations: Vec<SengridPersonalization>,
    from: SengridEmail,
    subject: String,
    content: Vec<SengridContent>,
}

#[derive(serde::Serialize)]
struct SengridEmail {
    email: String,
}

#[derive(serde::Serialize)]
struct SengridPersonalization {
    to: Vec<SengridEmail>,
}

#[derive(serde::Serialize)]
struct SengridContent {
    content_type: String,
    value: String,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SubscriberEmail,
        api_key: Secret<String>,
        app_base_url: String,
        timeout: Option<time::Duration>,
    ) -> EmailClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        EmailClient {
            http_client,
            base_url,
            sender,
            api_key,
            app_base_url,
        }
    }

    pub async fn send_email(
        &self,
        recipent: &SubscriberEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/mail/send", self.base_url);
        let body = SendEmailBody {
            from: SengridEmail {
                email: String::from(self.sender.as_ref()),
            },
            personalizations: vec![SengridPersonalization {
                to: vec![SengridEmail {
                    email: String::from(recipent.as_ref()),
                }],
            }],
            subject: String::from(subject),
            content: vec![SengridContent {
                content_type: String::from("text/html"),
                value: String::from(html_content),
            }],
        };

        self.http_client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?
            .error_for_status()?; // return an error when server response status code is 4xx or 5xx

        Ok(())
    }
}

impl ConfirmationEmailSender for EmailClient {
    async fn send_newsletter_confirmation_email(
        &self,
        to: &SubscriberEmail,
        token: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let confirmation_link = format!("{}/newsletter/confirm?token={}", self.app_base_url, token);
        let html_body = format!(
            r#"
                <div>
                    <h1>Welcome to our newsletter!</h1>
                    <p>Click <a href="{}">here</a> to confirm your subscription!</p>
                </div>
            "#,
            confirmation_link
        );

        self.send_email(to, "Confirm your newsletter subscription", &html_body)
            .await?;

        Ok(())
    }
}

impl WelcomeEmailSender for EmailClient {
    async fn send_newsletter_welcome_email(
        &self,
        to: &SubscriberEmail,
        gift_url: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let html_body = format!(
            r#"
                <div>
                    <h1>Thanks for confirming!</h1>
                    <p>We made you a little something: <a href="{}">your welcome gift</a>.</p>
                </div>
            "#,
            gift_url
        );

        self.send_email(to, "Welcome to our newsletter", &html_body)
            .await?;

        Ok(())
    }
}
