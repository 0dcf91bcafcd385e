use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::gift::GiftGenerator;
use crate::jobs;
use crate::messaging::{JobRegistry, Queue, WorkerPool};
use crate::routes::{
    handle_get_newsletters, handle_newsletter_confirm, handle_newsletter_signup, health_check,
    newsletter_confirm_page, newsletter_confirmed_page, newsletter_thanks_page,
};
use crate::storage::Store;

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let sender_email = config
            .get_email_client_sender()
            .expect("Sender email is not valid");
        let email_client = Arc::new(EmailClient::new(
            config.get_email_client_base_url(),
            sender_email,
            config.get_email_client_api(),
            config.get_app_base_url(),
            None,
        ));
        let gift_generator = Arc::new(GiftGenerator::new(
            db_pool.clone(),
            config.get_app_base_url(),
        ));

        // One registry per process, built before any message can be produced
        let mut registry = JobRegistry::new();
        jobs::confirmation_email(&mut registry, email_client.clone());
        jobs::welcome_email(&mut registry, email_client, gift_generator);

        let (queue, receiver) = Queue::new(config.get_queue_capacity());
        WorkerPool::new(
            Arc::new(registry),
            receiver,
            config.get_queue_workers(),
            config.get_dispatch_timeout(),
        )
        .spawn();

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, Store::new(db_pool), queue)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, store: Store, queue: Queue) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);
    let queue = web::Data::new(queue);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                "/newsletter/signup",
                web::post().to(handle_newsletter_signup),
            )
            .route("/newsletter/thanks", web::get().to(newsletter_thanks_page))
            .route(
                "/newsletter/confirm",
                web::get().to(newsletter_confirm_page),
            )
            .route(
                "/newsletter/confirm",
                web::post().to(handle_newsletter_confirm),
            )
            .route(
                "/newsletter/confirmed",
                web::get().to(newsletter_confirmed_page),
            )
            .route("/newsletters", web::get().to(handle_get_newsletters))
            .app_data(store.clone())
            .app_data(queue.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
