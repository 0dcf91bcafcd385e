use reqwest::{Response, Url};
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;
use wiremock::MockServer;

use newsletter_service::{
    config::{get_configuration, DatabaseSettings, Settings},
    startup::{get_connection_db_pool, Application},
};

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub port: u16,
    pub db_pool: PgPool,
    pub email_server: MockServer,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
        let email_server = MockServer::start().await;

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_email_client_base_url(email_server.uri());
        // The real port is only known after the app is built; get_confirmation_link patches it in
        config.set_app_base_url(String::from("http://127.0.0.1"));

        let db_pool = configure_db(&mut config.database, db_test_name.clone()).await;

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");
        let port = application.get_port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            port,
            config: config.clone(),
            db_pool,
            email_server,
        }
    }

    pub async fn post_signup(&self, body: HashMap<&str, &str>) -> Response {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        let url = format!("{}/newsletter/signup", self.address);

        client
            .post(&url)
            .form(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_confirm(&self, token: &str) -> Response {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        let url = format!("{}/newsletter/confirm", self.address);
        let body = HashMap::from([("token", token)]);

        client
            .post(&url)
            .form(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Block until the mock email provider has seen `count` requests. Emails
    /// go out from background workers, so the test has to wait for them.
    pub async fn wait_for_email_requests(&self, count: usize) -> Vec<wiremock::Request> {
        let deadline = Instant::now() + Duration::from_secs(5);

        loop {
            let received = self.email_server.received_requests().await.unwrap();
            if received.len() >= count {
                return received;
            }
            if Instant::now() > deadline {
                panic!(
                    "Expected {} email requests, saw {} before the deadline",
                    count,
                    received.len()
                );
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Pull the confirmation link out of a captured email request, pointing
    /// it at the test application's random port.
    pub fn get_confirmation_link(&self, email_request: &wiremock::Request) -> Url {
        let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
        let html = body["content"][0]["value"].as_str().unwrap();

        let links: Vec<_> = linkify::LinkFinder::new()
            .links(html)
            .filter(|link| *link.kind() == linkify::LinkKind::Url)
            .collect();
        assert_eq!(links.len(), 1);

        let mut confirmation_link = Url::parse(links[0].as_str()).unwrap();
        assert_eq!(confirmation_link.host_str(), Some("127.0.0.1"));
        confirmation_link.set_port(Some(self.port)).unwrap();

        confirmation_link
    }

    /// The token carried by a confirmation link.
    pub fn get_confirmation_token(confirmation_link: &Url) -> String {
        confirmation_link
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .expect("Confirmation link carries no token.")
    }
}

async fn configure_db(db_config: &mut DatabaseSettings, db_test_name: String) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect_with(&db_config.get_db_options())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    db_config.set_name(db_test_name);

    let db_pool = get_connection_db_pool(db_config);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}
