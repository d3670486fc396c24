//! SMTP reply parsing and line buffering
//!
//! SMTP replies are CRLF-terminated text lines starting with a
//! 3-digit status code. A `-` in the fourth column marks a
//! continuation line of a multi-line reply; only the final line of
//! the group completes the reply and drives the exchange.

/// A parsed SMTP reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The 3-digit status code.
    pub code: u16,
    /// `true` for a `XYZ-...` continuation line of a multi-line reply.
    pub continued: bool,
    /// The full reply line as received, without the CRLF.
    pub line: String,
}

impl Reply {
    /// Parse one reply line.
    ///
    /// Returns `None` when the line does not start with a 3-digit
    /// status code; such lines carry nothing the exchange can act on.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let digits = line.get(..3)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let code = digits.parse().ok()?;
        let continued = line.as_bytes().get(3) == Some(&b'-');
        Some(Self {
            code,
            continued,
            line: line.to_string(),
        })
    }

    /// Whether this reply is a 4xx (transient) or 5xx (permanent)
    /// failure. Fatal at every step of the exchange.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.code / 100, 4 | 5)
    }
}

/// Accumulates raw socket bytes and yields complete CRLF-terminated
/// lines. A trailing partial line stays buffered until the rest of it
/// arrives; it is never handed out early.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append a chunk of received bytes and drain every complete
    /// line, CRLF terminators stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = find_crlf(&self.buf) {
            let rest = self.buf.split_off(pos + 2);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.truncate(pos);
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}
