//! Environment-driven configuration.
//!
//! All processes (web app and both workers) read the same `Config`; fields a
//! process does not need are simply left unused. Call sites that require the
//! database use [`Config::database_url`] which surfaces a missing variable as
//! a configuration error instead of a panic.

use std::env;

use crate::error::AppError;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_INGRESS_TOPIC: &str = "thumbnail-service";
const DEFAULT_THUMBNAIL_SUBSCRIPTION: &str = "thumbnail-workers";
const DEFAULT_SAFEIMAGE_SUBSCRIPTION: &str = "safeimage-workers";

#[derive(Clone, Debug)]
pub struct Config {
    /// Cloud project identifier; also the bucket-name prefix.
    pub project_id: String,
    /// Postgres connection string; required by the web app and the
    /// thumbnail worker, unused by the safe-content worker.
    database_url: Option<String>,
    /// Object-store bucket holding originals and thumbnails.
    pub bucket: String,
    /// Topic the upload handler publishes new-object keys to.
    pub ingress_topic: String,
    /// Subscription the thumbnail worker pulls from.
    pub thumbnail_subscription: String,
    /// Subscription the safe-content worker pulls from (raw storage
    /// notifications).
    pub safeimage_subscription: String,
    pub server_port: u16,
    /// OAuth bearer token for the Google REST APIs. In deployment this is
    /// minted by the service-account metadata endpoint; locally it comes
    /// from `gcloud auth print-access-token`.
    pub gcp_access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let project_id = require("PROJECT_ID")?;
        let bucket =
            env::var("BUCKET").unwrap_or_else(|_| format!("{project_id}-photostore"));
        let server_port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| AppError::Config(format!("invalid PORT: {v}")))?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            project_id,
            database_url: env::var("DATABASE_URL").ok(),
            bucket,
            ingress_topic: env::var("INGRESS_TOPIC")
                .unwrap_or_else(|_| DEFAULT_INGRESS_TOPIC.to_string()),
            thumbnail_subscription: env::var("THUMBNAIL_SUBSCRIPTION")
                .unwrap_or_else(|_| DEFAULT_THUMBNAIL_SUBSCRIPTION.to_string()),
            safeimage_subscription: env::var("SAFEIMAGE_SUBSCRIPTION")
                .unwrap_or_else(|_| DEFAULT_SAFEIMAGE_SUBSCRIPTION.to_string()),
            server_port,
            gcp_access_token: env::var("GCP_ACCESS_TOKEN").ok(),
        })
    }

    pub fn database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))
    }
}

fn require(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{name} is not set")))
}
