//! One-shot flash messages.
//!
//! A message set while handling one request is shown once on the next and
//! then cleared. Storage of the bag between requests (cookie, server-side
//! session) belongs to the host application; the bag is serde-serializable
//! for that purpose.

use minijinja::HtmlEscape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a flash message, rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// An operation went through.
    Success,
    /// An operation was rejected.
    Error,
    /// Something needs attention.
    Warning,
    /// Neutral notice.
    #[default]
    Info,
}

impl MessageKind {
    /// CSS class name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Info => "info",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored flash message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Message text, unescaped.
    pub message: String,
    /// CSS class the message is rendered with.
    #[serde(default)]
    pub kind: MessageKind,
}

impl FlashMessage {
    /// Render the message as an HTML block.
    pub fn to_html(&self) -> String {
        format!(
            "<div class='message {}'>{}</div>",
            self.kind,
            HtmlEscape(&self.message)
        )
    }
}

/// Holds at most one pending flash message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashBag {
    pending: Option<FlashMessage>,
}

impl FlashBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message, replacing any pending one.
    pub fn set(&mut self, message: impl Into<String>, kind: MessageKind) {
        self.pending = Some(FlashMessage {
            message: message.into(),
            kind,
        });
    }

    /// Peek at the pending message without clearing it.
    pub fn peek(&self) -> Option<&FlashMessage> {
        self.pending.as_ref()
    }

    /// Remove and return the pending message.
    pub fn take(&mut self) -> Option<FlashMessage> {
        self.pending.take()
    }

    /// Render and clear the pending message; empty string when there is none.
    pub fn display(&mut self) -> String {
        self.take().map(|m| m.to_html()).unwrap_or_default()
    }

    /// Check if a message is pending.
    pub fn has_message(&self) -> bool {
        self.pending.is_some()
    }
}
