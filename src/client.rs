//! SMTP submission client
//!
//! Each [`SmtpClient::send`] call opens one TLS connection, drives
//! the exchange through the [`State`] machine, and closes the
//! connection again. The whole exchange is half-duplex: one command
//! goes out, then the session suspends until the next complete reply
//! line arrives or the deadline fires.

use crate::config::SmtpConfig;
use crate::connection::{self, SmtpStream};
use crate::error::{Error, Result};
use crate::message::Mail;
use crate::reply::{LineBuffer, Reply};
use crate::state::{Exchange, State, Transition};
use serde::Serialize;
use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Acknowledgement of an accepted submission.
///
/// Carries the literal `250` queue line from the relay, which embeds
/// the relay's queue identifier.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub reply: String,
}

/// SMTP submission client for the configured relay.
///
/// Holds only the configuration; every call builds its session state
/// from scratch, so nothing is shared between concurrent sends.
pub struct SmtpClient {
    config: SmtpConfig,
}

impl SmtpClient {
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Submit one message to the relay.
    ///
    /// The exchange, connect through `QUIT`, is bounded by
    /// `config.timeout`; expiry cancels the in-flight exchange (which
    /// closes the connection) and returns [`Error::Timeout`]. There
    /// are no retries; a failed attempt is a failed call.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] when the relay rejects a step with a
    /// 4xx/5xx reply (carrying the literal reply line),
    /// [`Error::Tls`] or [`Error::Io`] on transport faults, and
    /// [`Error::Timeout`] on deadline expiry.
    pub async fn send(&self, mail: &Mail) -> Result<Receipt> {
        tokio::time::timeout(self.config.timeout, self.submit(mail))
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))?
    }

    /// Probe relay connectivity: connect, wait for the greeting, then
    /// `EHLO` and `QUIT`. Returns the greeting line.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`send`](Self::send); nothing is submitted.
    pub async fn check(&self) -> Result<String> {
        tokio::time::timeout(self.config.timeout, self.probe())
            .await
            .map_err(|_| Error::Timeout(self.config.timeout))?
    }

    async fn submit(&self, mail: &Mail) -> Result<Receipt> {
        let mime = mail.to_mime(&self.config.from);
        let cx = Exchange {
            client_name: &self.config.client_name,
            username: &self.config.username,
            password: &self.config.password,
            recipient: &mail.to,
            mime: &mime,
        };

        let mut stream = connection::connect(&self.config).await?;
        let mut lines = Lines::new();
        let mut state = State::Greeting;

        loop {
            let reply = lines.final_reply(&mut stream).await?;
            if reply.code != state.expects() {
                warn!("Ignoring unexpected {} in {:?}", reply.code, state);
                continue;
            }

            match state.advance(&cx) {
                Transition::Send { command, next } => {
                    if state.sends_credentials() {
                        debug!("> <credentials>");
                    } else {
                        debug!("> {}", command);
                    }
                    write_line(&mut stream, &command).await?;
                    state = next;
                }
                Transition::Quit => {
                    debug!("> QUIT");
                    write_line(&mut stream, "QUIT").await?;
                    stream.shutdown().await.ok();
                    info!("Message to {} accepted by relay", mail.to);
                    return Ok(Receipt { reply: reply.line });
                }
            }
        }
    }

    async fn probe(&self) -> Result<String> {
        let mut stream = connection::connect(&self.config).await?;
        let mut lines = Lines::new();

        let greeting = wait_for(&mut lines, &mut stream, 220).await?;
        let ehlo = format!("EHLO {}", self.config.client_name);
        debug!("> {}", ehlo);
        write_line(&mut stream, &ehlo).await?;
        wait_for(&mut lines, &mut stream, 250).await?;
        debug!("> QUIT");
        write_line(&mut stream, "QUIT").await?;
        stream.shutdown().await.ok();

        info!("SMTP relay reachable: {}", greeting);
        Ok(greeting)
    }
}

async fn wait_for(lines: &mut Lines, stream: &mut SmtpStream, code: u16) -> Result<String> {
    loop {
        let reply = lines.final_reply(stream).await?;
        if reply.code == code {
            return Ok(reply.line);
        }
        warn!("Ignoring unexpected {} while waiting for {}", reply.code, code);
    }
}

/// Reads reply lines off the stream through a [`LineBuffer`]. One
/// socket read may complete several lines; the surplus queues here
/// until asked for.
struct Lines {
    buffer: LineBuffer,
    pending: VecDeque<String>,
}

impl Lines {
    const fn new() -> Self {
        Self {
            buffer: LineBuffer::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next complete line from the stream.
    async fn next<S: AsyncRead + Unpin>(&mut self, stream: &mut S) -> Result<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(line);
            }
            let mut chunk = [0u8; 4096];
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "relay closed the connection mid-exchange",
                )));
            }
            self.pending.extend(self.buffer.push(&chunk[..n]));
        }
    }

    /// Final line of the next reply. Continuation lines of a
    /// multi-line reply are skipped, unparseable lines ignored, and a
    /// 4xx/5xx final line is fatal.
    async fn final_reply<S: AsyncRead + Unpin>(&mut self, stream: &mut S) -> Result<Reply> {
        loop {
            let line = self.next(stream).await?;
            debug!("< {}", line);

            let Some(reply) = Reply::parse(&line) else {
                warn!("Unparseable reply line: {}", line);
                continue;
            };
            if reply.continued {
                continue;
            }
            if reply.is_failure() {
                return Err(Error::Protocol(reply.line));
            }
            return Ok(reply);
        }
    }
}

async fn write_line<S: AsyncWrite + Unpin>(stream: &mut S, line: &str) -> Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;
    stream.flush().await?;
    Ok(())
}
