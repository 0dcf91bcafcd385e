pub mod health_check;
pub mod newsletter_confirm;
pub mod newsletter_signup;
pub mod newsletters;

pub use health_check::health_check;
pub use newsletter_confirm::{
    handle_newsletter_confirm, newsletter_confirm_page, newsletter_confirmed_page,
};
pub use newsletter_signup::{handle_newsletter_signup, newsletter_thanks_page};
pub use newsletters::handle_get_newsletters;
