mod health_check;
mod helpers;
mod newsletter_confirm;
