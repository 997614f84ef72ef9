//! Data models for chat conversations

use serde::{Deserialize, Serialize};

/// One message in a chat-completion conversation.
///
/// A conversation is an ordered sequence of messages; position 0 holds the
/// system-priming directive and is kept alive across truncation whenever
/// structurally possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Optional author name; when set, the role is omitted from the
    /// message framing on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
        }
    }

    pub fn with_name(
        role: impl Into<String>,
        content: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: Some(name.into()),
        }
    }
}
