pub mod config;
pub mod domain;
pub mod email_client;
pub mod gift;
pub mod jobs;
pub mod messaging;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod telemetry;
