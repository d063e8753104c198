use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to the command layer.
#[derive(Debug, Error)]
pub enum PowerError {
    #[error("Invalid format `{0}`! Use something like `19d 17h 52m`.")]
    InvalidFormat(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid recipient `{0}`")]
    InvalidRecipient(String),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("discord: {0}")]
    Discord(#[from] poise::serenity_prelude::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {name}: `{value}`")]
    Invalid { name: &'static str, value: String },
}
