//! Error types for pebble-mailer

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The relay answered a command with a 4xx or 5xx reply. Carries
    /// the literal reply line.
    #[error("SMTP error: {0}")]
    Protocol(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The exchange did not complete within the send deadline.
    #[error("SMTP exchange timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
