//! Outbound mail and MIME rendering
//!
//! A [`Mail`] holds the recipient, subject, and body parts of one
//! outbound message. Rendering produces a `multipart/alternative`
//! document offering a plain-text and an HTML view of the same
//! content, separated by a per-send unique boundary token.

use std::sync::atomic::{AtomicU64, Ordering};

/// One outbound message.
#[derive(Debug, Clone)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text: String,
    /// HTML alternative; the plain text is reused when absent.
    pub html: Option<String>,
}

impl Mail {
    #[must_use]
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
        }
    }

    /// Attach an HTML alternative to the plain-text body.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Render the full MIME document for the `DATA` phase: headers
    /// through closing boundary, CRLF line endings, no terminator
    /// line (the protocol layer appends it).
    #[must_use]
    pub fn to_mime(&self, from: &str) -> String {
        self.to_mime_with_boundary(from, &next_boundary())
    }

    fn to_mime_with_boundary(&self, from: &str, boundary: &str) -> String {
        let html = self.html.as_deref().unwrap_or(&self.text);
        let lines = vec![
            format!("From: {from}"),
            format!("To: {}", self.to),
            format!("Subject: {}", self.subject),
            format!("Date: {}", chrono::Utc::now().to_rfc2822()),
            "MIME-Version: 1.0".to_string(),
            format!("Content-Type: multipart/alternative; boundary=\"{boundary}\""),
            String::new(),
            format!("--{boundary}"),
            "Content-Type: text/plain; charset=utf-8".to_string(),
            "Content-Transfer-Encoding: 7bit".to_string(),
            String::new(),
            self.text.clone(),
            String::new(),
            format!("--{boundary}"),
            "Content-Type: text/html; charset=utf-8".to_string(),
            "Content-Transfer-Encoding: 7bit".to_string(),
            String::new(),
            html.to_string(),
            String::new(),
            format!("--{boundary}--"),
        ];
        lines.join("\r\n")
    }
}

/// Boundary tokens must differ between sends. The timestamp alone can
/// repeat within one clock tick, so a process-wide counter is
/// appended.
fn next_boundary() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("NextPart_{}_{seq}", chrono::Utc::now().timestamp_micros())
}
