//! In-process fake SMTP server for integration testing
//!
//! # How SMTP submission works (educational overview)
//!
//! SMTP (Simple Mail Transfer Protocol, RFC 5321) is a text-based
//! command/response protocol. The client opens a connection, the
//! server greets it, and from then on the client sends one command
//! per line and waits for a reply before sending the next:
//!
//! ```text
//!   Server:  220 smtp.example.com ESMTP ready
//!   Client:  EHLO client.local
//!   Server:  250 smtp.example.com at your service
//!   Client:  AUTH LOGIN
//!   Server:  334 VXNlcm5hbWU6          (base64 "Username:")
//!   ...
//! ```
//!
//! Every reply starts with a 3-digit status code: 2xx/3xx means the
//! exchange proceeds, 4xx/5xx is a rejection. A `-` after the code
//! marks a continuation line of a multi-line reply.
//!
//! ## The DATA phase
//!
//! After the server answers `DATA` with `354`, the client streams the
//! full MIME message and terminates it with a line holding only `.`.
//! The server then acks the whole message with a single `250`.
//!
//! This fake server does not interpret any of that: it plays back a
//! fixed [`Script`] of replies, one turn per client command, and
//! records every command it received so tests can assert on the
//! exact wire sequence.

use super::io::write_line;
use super::script::{ReplyGroup, Script};
use rcgen::generate_simple_self_signed;
use rustls::pki_types::PrivatePkcs8KeyDer;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// A fake SMTP relay on localhost with an OS-assigned port.
///
/// The server generates a self-signed TLS certificate at startup
/// using `rcgen`, so no cert files are needed. It accepts the TLS
/// handshake immediately after the TCP connect (implicit TLS, the
/// port 465 model) and then plays back its reply script.
pub struct FakeSmtpServer {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
    /// Handle to the background task so it lives as long as the server.
    _handle: tokio::task::JoinHandle<()>,
}

impl FakeSmtpServer {
    /// Start a new fake relay that plays back `script`.
    ///
    /// 1. Binds to `127.0.0.1:0` -- the OS picks a free port.
    /// 2. Generates a self-signed TLS certificate via `rcgen`.
    /// 3. Spawns a tokio task that accepts connections and speaks
    ///    the scripted SMTP session.
    ///
    /// The server runs until the `FakeSmtpServer` is dropped.
    pub async fn start(script: Script) -> Self {
        // Ensure the ring crypto provider is installed process-wide.
        // Multiple tests may race to install it, so the error is
        // ignored if it's already set.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let port = listener.local_addr().unwrap().port();

        // "127.0.0.1" as the subject alt name since that's what the
        // client connects to.
        let cert = generate_simple_self_signed(vec!["127.0.0.1".to_string()])
            .expect("generate self-signed cert");

        let cert_der = cert.cert.der().clone();
        let key_der = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());

        let tls_config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert_der], key_der.into())
            .expect("build server TLS config");

        let acceptor = TlsAcceptor::from(Arc::new(tls_config));
        let commands = Arc::new(Mutex::new(Vec::new()));

        // Accept loop; each connection replays the script from the
        // top.
        let recorded = commands.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _addr)) = listener.accept().await else {
                    break;
                };
                let acceptor = acceptor.clone();
                let script = script.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    handle_connection(stream, acceptor, script, &recorded).await;
                });
            }
        });

        Self {
            port,
            commands,
            _handle: handle,
        }
    }

    /// The port the server is listening on.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Everything the client has sent so far, one entry per command.
    /// The DATA payload is recorded as a single entry, terminator
    /// line included.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

/// Handle one client connection: TLS handshake, greeting, then the
/// scripted command/reply loop.
async fn handle_connection(
    stream: tokio::net::TcpStream,
    acceptor: TlsAcceptor,
    script: Script,
    commands: &Mutex<Vec<String>>,
) {
    let Ok(tls_stream) = acceptor.accept(stream).await else {
        return;
    };
    let mut reader = BufReader::new(tls_stream);
    let mut turns = script.turns.into_iter();

    // Empty script: accept the handshake, never write, and hold the
    // connection open until the client goes away. Used by the
    // timeout tests.
    let Some(greeting) = turns.next() else {
        let mut sink = String::new();
        loop {
            match reader.read_line(&mut sink).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    };
    if write_group(&mut reader, &greeting).await.is_err() {
        return;
    }

    let mut in_data = false;
    loop {
        let entry = if in_data {
            match read_data_payload(&mut reader).await {
                Some(payload) => payload,
                None => return,
            }
        } else {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        };
        in_data = false;
        commands.lock().unwrap().push(entry.clone());

        if entry.eq_ignore_ascii_case("QUIT") {
            // The client does not wait for the goodbye, but a real
            // relay sends one.
            let _ = write_line(&mut reader, "221 2.0.0 bye\r\n").await;
            return;
        }

        let Some(turn) = turns.next() else {
            return;
        };
        let final_line = turn.lines.last().cloned().unwrap_or_default();
        if write_group(&mut reader, &turn).await.is_err() {
            return;
        }
        // After a 354 go-ahead the next client turn is the whole
        // message payload, not a command line.
        in_data = final_line.starts_with("354");
    }
}

/// Read the DATA payload: every line up to and including the one
/// holding only `.`, rejoined with CRLF.
async fn read_data_payload<S: AsyncRead + AsyncWrite + Unpin>(
    reader: &mut BufReader<S>,
) -> Option<String> {
    let mut collected = Vec::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
        let done = trimmed == ".";
        collected.push(trimmed);
        if done {
            return Some(collected.join("\r\n"));
        }
    }
}

/// Write all lines of one reply group, CRLF-terminated.
async fn write_group<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut BufReader<S>,
    group: &ReplyGroup,
) -> std::io::Result<()> {
    for line in &group.lines {
        write_line(stream, &format!("{line}\r\n")).await?;
    }
    Ok(())
}
