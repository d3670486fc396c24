//! SMTP relay configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

/// SMTP relay configuration for outbound mail
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// RFC 5322 `From:` header value, e.g. `PebbleNotes <notes@example.com>`.
    pub from: String,
    /// Hostname announced in the `EHLO` greeting.
    pub client_name: String,
    /// Deadline for one whole exchange, connect through `QUIT`.
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `SMTP_USER`
    /// - `SMTP_PASS`
    ///
    /// Optional (with defaults):
    /// - `SMTP_HOST` (default: `smtp.gmail.com`)
    /// - `SMTP_PORT` (default: `465`)
    /// - `SMTP_FROM` (default: `PebbleNotes <SMTP_USER>`)
    /// - `SMTP_CLIENT_NAME` (default: `pebblenotes.local`)
    /// - `SMTP_TIMEOUT_SECS` (default: `20`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or
    /// a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let username =
            env::var("SMTP_USER").map_err(|_| Error::Config("SMTP_USER not set".into()))?;
        let from =
            env::var("SMTP_FROM").unwrap_or_else(|_| format!("PebbleNotes <{username}>"));

        Ok(Self {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "465".to_string())
                .parse()
                .map_err(|e| Error::Config(format!("Invalid SMTP_PORT: {e}")))?,
            password: env::var("SMTP_PASS")
                .map_err(|_| Error::Config("SMTP_PASS not set".into()))?,
            client_name: env::var("SMTP_CLIENT_NAME")
                .unwrap_or_else(|_| "pebblenotes.local".to_string()),
            timeout: Duration::from_secs(
                env::var("SMTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid SMTP_TIMEOUT_SECS: {e}")))?,
            ),
            username,
            from,
        })
    }
}
