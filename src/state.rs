//! The SMTP submission state machine
//!
//! One submission is a linear exchange: every state names the reply
//! code it waits for and, on seeing it, the command to emit and the
//! state to enter. Failure replies (4xx/5xx) abort the exchange from
//! any state; that check lives in the session driver, not here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Protocol states of one submission exchange, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the `220` connection greeting.
    Greeting,
    /// `EHLO` sent, waiting for `250`.
    Hello,
    /// `AUTH LOGIN` sent, waiting for the `334` username challenge.
    AuthLogin,
    /// Username sent, waiting for the `334` password challenge.
    Username,
    /// Password sent, waiting for `235` (authentication accepted).
    Password,
    /// `MAIL FROM` sent, waiting for `250`.
    MailFrom,
    /// `RCPT TO` sent, waiting for `250`.
    RcptTo,
    /// `DATA` sent, waiting for the `354` go-ahead.
    Data,
    /// Message payload sent, waiting for the `250` queue ack.
    Payload,
}

/// What the session driver does once a state's expected reply arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Write `command` (the wire CRLF is appended by the driver) and
    /// enter `next`.
    Send { command: String, next: State },
    /// Write `QUIT` and report the submission as accepted.
    Quit,
}

/// Everything the states interpolate into commands, borrowed from the
/// session for the duration of one exchange.
pub struct Exchange<'a> {
    pub client_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub recipient: &'a str,
    /// Rendered MIME document, without the `DATA` terminator.
    pub mime: &'a str,
}

impl State {
    /// The reply code this state waits for.
    #[must_use]
    pub const fn expects(self) -> u16 {
        match self {
            Self::Greeting => 220,
            Self::Hello | Self::MailFrom | Self::RcptTo | Self::Payload => 250,
            Self::AuthLogin | Self::Username => 334,
            Self::Password => 235,
            Self::Data => 354,
        }
    }

    /// The transition taken once the expected reply arrived.
    ///
    /// The envelope sender is the authenticated account itself; the
    /// display `From:` header inside the MIME document may differ.
    #[must_use]
    pub fn advance(self, cx: &Exchange<'_>) -> Transition {
        match self {
            Self::Greeting => Transition::Send {
                command: format!("EHLO {}", cx.client_name),
                next: Self::Hello,
            },
            Self::Hello => Transition::Send {
                command: "AUTH LOGIN".to_string(),
                next: Self::AuthLogin,
            },
            Self::AuthLogin => Transition::Send {
                command: BASE64.encode(cx.username),
                next: Self::Username,
            },
            Self::Username => Transition::Send {
                command: BASE64.encode(cx.password),
                next: Self::Password,
            },
            Self::Password => Transition::Send {
                command: format!("MAIL FROM:<{}>", cx.username),
                next: Self::MailFrom,
            },
            Self::MailFrom => Transition::Send {
                command: format!("RCPT TO:<{}>", cx.recipient),
                next: Self::RcptTo,
            },
            Self::RcptTo => Transition::Send {
                command: "DATA".to_string(),
                next: Self::Data,
            },
            // End of DATA: the document, then a line holding only `.`.
            Self::Data => Transition::Send {
                command: format!("{}\r\n.", cx.mime),
                next: Self::Payload,
            },
            Self::Payload => Transition::Quit,
        }
    }

    /// `true` for the states whose outgoing line is a credential and
    /// must not reach the logs.
    #[must_use]
    pub const fn sends_credentials(self) -> bool {
        matches!(self, Self::AuthLogin | Self::Username)
    }
}
