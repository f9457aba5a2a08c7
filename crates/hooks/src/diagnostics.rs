//! Bounded failure-reason buffer for hosts with a C-style hook ABI.
//!
//! The host hands in a buffer of `capacity` bytes and expects a
//! NUL-terminated message, so at most `capacity - 1` bytes of text fit.

/// Fixed-capacity diagnostics text, written only when a hook fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBuffer {
    capacity: usize,
    text: Option<String>,
}

impl DiagnosticBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            text: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store `message`, truncated to fit with its terminator.
    ///
    /// Truncation never splits a UTF-8 sequence.
    pub fn write(&mut self, message: &str) {
        let limit = self.capacity.saturating_sub(1);
        let mut end = message.len().min(limit);
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        self.text = Some(message[..end].to_string());
    }

    /// Message written by the last failing hook, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Bytes as the host sees them: text followed by a NUL.
    pub fn to_c_bytes(&self) -> Vec<u8> {
        let text = self.text.as_deref().unwrap_or("");
        let mut bytes = text.as_bytes().to_vec();
        if self.capacity > 0 {
            bytes.push(0);
        }
        bytes
    }
}
