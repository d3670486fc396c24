//! Raw SMTP submission client for PebbleNotes
//!
//! Delivers transactional email (account verification, password
//! resets, welcome messages) by speaking the SMTP protocol directly
//! over an implicit-TLS connection to the configured relay, instead
//! of delegating to a higher-level mail library.
//!
//! One [`SmtpClient::send`] call opens one connection, drives the
//! EHLO / AUTH LOGIN / MAIL FROM / RCPT TO / DATA / QUIT exchange
//! through an explicit state machine, and closes the connection on
//! every exit path. No session state survives the call.

mod client;
mod config;
mod connection;
mod error;
mod message;
mod reply;
mod state;
pub mod templates;

pub use client::{Receipt, SmtpClient};
pub use config::SmtpConfig;
pub use error::{Error, Result};
pub use message::Mail;
