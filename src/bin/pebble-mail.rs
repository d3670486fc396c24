#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for sending PebbleNotes transactional email over raw SMTP

use clap::{Parser, Subcommand};
use pebble_mailer::{Mail, SmtpClient, SmtpConfig, templates};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pebble-mail")]
#[command(about = "Send PebbleNotes transactional email over raw SMTP")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Send an arbitrary message
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Subject line
        #[arg(long)]
        subject: String,

        /// Plain-text body
        #[arg(long)]
        text: String,

        /// HTML body (falls back to the plain text when omitted)
        #[arg(long)]
        html: Option<String>,
    },

    /// Send an account-verification message
    Verification {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Recipient display name
        #[arg(long)]
        name: Option<String>,

        /// Verification link
        #[arg(long)]
        link: String,
    },

    /// Send a password-reset message
    PasswordReset {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Recipient display name
        #[arg(long)]
        name: Option<String>,

        /// Reset link
        #[arg(long)]
        link: String,
    },

    /// Send a post-verification welcome message
    Welcome {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Recipient display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Probe relay connectivity (connect, EHLO, QUIT)
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let json = args.json;
    let config = SmtpConfig::from_env()?;
    let client = SmtpClient::new(config);

    match args.command {
        Command::Send {
            to,
            subject,
            text,
            html,
        } => {
            let mut mail = Mail::new(to, subject, text);
            if let Some(html) = html {
                mail = mail.with_html(html);
            }
            deliver(&client, &mail, json).await?;
        }
        Command::Verification { to, name, link } => {
            let mail = templates::verification(&to, name.as_deref(), &link);
            deliver(&client, &mail, json).await?;
        }
        Command::PasswordReset { to, name, link } => {
            let mail = templates::password_reset(&to, name.as_deref(), &link);
            deliver(&client, &mail, json).await?;
        }
        Command::Welcome { to, name } => {
            let mail = templates::welcome(&to, name.as_deref());
            deliver(&client, &mail, json).await?;
        }
        Command::Check => {
            let greeting = client.check().await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "greeting": greeting
                    }))?
                );
            } else {
                println!("Relay reachable: {greeting}");
            }
        }
    }

    Ok(())
}

async fn deliver(client: &SmtpClient, mail: &Mail, json: bool) -> anyhow::Result<()> {
    let receipt = client.send(mail).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("Accepted: {}", receipt.reply);
    }
    Ok(())
}
