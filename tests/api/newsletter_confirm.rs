use sqlx::{postgres::PgRow, Row};
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;
use crate::newsletter_signup::map_subscriber_row;

async fn signup_and_get_token(test_app: &TestApp) -> String {
    test_app
        .post_signup(HashMap::from([("email", "frank@test.com")]))
        .await;

    let received_requests = test_app.wait_for_email_requests(1).await;
    let confirmation_link = test_app.get_confirmation_link(&received_requests[0]);

    TestApp::get_confirmation_token(&confirmation_link)
}

#[tokio::test]
async fn the_confirmation_link_renders_a_confirm_form() {
    let test_app = TestApp::spawn_app().await;
    let client = reqwest::Client::new();

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    test_app
        .post_signup(HashMap::from([("email", "frank@test.com")]))
        .await;
    let received_requests = test_app.wait_for_email_requests(1).await;
    let confirmation_link = test_app.get_confirmation_link(&received_requests[0]);
    let token = TestApp::get_confirmation_token(&confirmation_link);

    let response = client.get(confirmation_link).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let html = response.text().await.unwrap();
    assert!(html.contains(&token));
}

#[tokio::test]
async fn confirming_marks_the_subscriber_confirmed_and_consumes_the_token() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    let token = signup_and_get_token(&test_app).await;
    let response = test_app.post_confirm(&token).await;

    assert_eq!(303, response.status().as_u16());
    assert_eq!(
        response.headers().get("Location").unwrap(),
        "/newsletter/confirmed"
    );

    let subscriber = sqlx::query(
        "SELECT email, status, token, created_at, updated_at FROM newsletter_subscribers;",
    )
    .map(map_subscriber_row)
    .fetch_one(&test_app.db_pool)
    .await
    .expect("Failed to fetch saved subscriber.");

    assert!(subscriber.status.is_confirmed());
    assert_eq!(subscriber.token, "");
}

#[tokio::test]
async fn confirming_sends_a_welcome_email_with_a_saved_gift() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    let token = signup_and_get_token(&test_app).await;
    test_app.post_confirm(&token).await;

    // Confirmation email first, welcome email second
    let received_requests = test_app.wait_for_email_requests(2).await;
    let body: serde_json::Value = serde_json::from_slice(&received_requests[1].body).unwrap();
    let html = body["content"][0]["value"].as_str().unwrap();
    assert!(html.contains("/gifts/frank-"));

    let gift_name = sqlx::query("SELECT name FROM newsletter_gifts;")
        .map(|row: PgRow| row.get::<String, _>("name"))
        .fetch_one(&test_app.db_pool)
        .await
        .expect("Failed to fetch saved gift.");

    // The gift name is seeded with the email's local part
    assert!(gift_name.starts_with("frank-"));
}

#[tokio::test]
async fn a_never_issued_token_is_rejected_with_400() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.post_confirm("definitely-not-a-real-token-123").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn an_empty_token_is_rejected_with_400() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.post_confirm("").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn a_consumed_token_cannot_confirm_a_second_time() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    let token = signup_and_get_token(&test_app).await;

    let first = test_app.post_confirm(&token).await;
    assert_eq!(303, first.status().as_u16());

    let second = test_app.post_confirm(&token).await;
    assert_eq!(400, second.status().as_u16());
}
