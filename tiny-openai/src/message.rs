//! Chat message types and conversation history slicing.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions.
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

impl Role {
    /// Get the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A role-tagged chat message, as sent in the `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Trailing slice of `history` covering the last `depth` exchanges.
///
/// An exchange is two entries (user and assistant). The sign of `depth` is
/// ignored, `0` selects the whole history, and the result is clamped to the
/// available entries.
#[must_use]
pub fn tail_exchanges(history: &[ChatMessage], depth: i64) -> &[ChatMessage] {
    let wanted = depth.unsigned_abs().saturating_mul(2);
    let len = history.len();
    let take = if wanted == 0 {
        len
    } else {
        usize::try_from(wanted).map_or(len, |w| w.min(len))
    };
    &history[len - take..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(exchanges: usize) -> Vec<ChatMessage> {
        (0..exchanges)
            .flat_map(|i| {
                [
                    ChatMessage::user(format!("q{i}")),
                    ChatMessage::assistant(format!("a{i}")),
                ]
            })
            .collect()
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("be brief")).unwrap_or_default();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn zero_depth_is_whole_history() {
        let h = history(3);
        assert_eq!(tail_exchanges(&h, 0).len(), 6);
    }

    #[test]
    fn depth_counts_exchanges() {
        let h = history(5);
        let tail = tail_exchanges(&h, 2);
        assert_eq!(tail.len(), 4);
        assert_eq!(tail[0].content, "q3");
        assert_eq!(tail[3].content, "a4");
    }

    #[test]
    fn depth_is_clamped() {
        let h = history(2);
        assert_eq!(tail_exchanges(&h, 10).len(), 4);
        assert!(tail_exchanges(&[], 3).is_empty());
    }

    #[test]
    fn negative_depth_uses_magnitude() {
        let h = history(4);
        assert_eq!(tail_exchanges(&h, -1), tail_exchanges(&h, 1));
        assert_eq!(tail_exchanges(&h, i64::MIN).len(), 8);
    }

    #[test]
    fn min_of_double_depth_and_length() {
        for n in 0..4 {
            let h = history(n);
            for d in 1_u8..6 {
                let expected = (2 * usize::from(d)).min(2 * n);
                assert_eq!(tail_exchanges(&h, i64::from(d)).len(), expected);
            }
        }
    }
}
