//! Support-chat domain types.
//!
//! Conversations connect a customer (`User`) with the admin side
//! (`Staff`). The gateway reports conversation status as a free-form
//! string (`open`, `pending`, `closed`, and `active` after reactivation),
//! so the status stays a `String` with predicates for the well-known
//! values rather than a closed enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the conversation authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SenderType {
    /// The customer.
    User,
    /// Admin-side staff.
    Staff,
}

impl SenderType {
    /// Whether the sender is the customer.
    #[must_use]
    pub const fn is_customer(self) -> bool {
        matches!(self, Self::User)
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-issued message id; also serves as the polling cursor.
    pub id: String,
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Id of the author.
    #[serde(default)]
    pub sender_id: String,
    /// Side that authored the message.
    pub sender_type: SenderType,
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// Whether the admin side has read the message.
    #[serde(default)]
    pub is_read: bool,
}

/// A conversation summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Server-issued conversation id.
    pub id: String,
    /// Customer who owns the conversation.
    pub user_id: String,
    /// Free-form status string.
    #[serde(default)]
    pub status: String,
    /// When the conversation was opened.
    pub created_at: DateTime<Utc>,
    /// When the conversation last changed.
    pub updated_at: DateTime<Utc>,
    /// Number of messages the server has recorded.
    #[serde(default)]
    pub message_count: u64,
}

impl Conversation {
    /// Whether the status is the well-known `open` value.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("open")
    }

    /// Whether the status is the well-known `pending` value.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }

    /// Whether the status is the well-known `closed` value.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status.eq_ignore_ascii_case("closed")
    }
}

/// A conversation with its full message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDetail {
    /// The summary fields.
    #[serde(flatten)]
    pub conversation: Conversation,
    /// All messages known to the server, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationDetail {
    /// Id of the newest known message, used as the polling cursor.
    #[must_use]
    pub fn last_message_id(&self) -> Option<&str> {
        self.messages.last().map(|message| message.id.as_str())
    }

    /// Customer messages the admin side has not read yet.
    pub fn unread_from_customer(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|message| message.sender_type.is_customer() && !message.is_read)
    }
}

/// Body of a staff message about to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    /// Customer the conversation belongs to.
    pub user_id: String,
    /// Id of the staff member sending the message.
    pub sender_id: String,
    /// Always `Staff` for messages sent from the console.
    pub sender_type: SenderType,
    /// Message text.
    pub content: String,
    /// Target conversation.
    pub conversation_id: String,
}

/// Aggregates over a conversation listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversationStats {
    /// Number of conversations.
    pub total: u64,
    /// Conversations with status `open`.
    pub open: u64,
    /// Conversations with status `pending`.
    pub pending: u64,
    /// Conversations with status `closed`.
    pub closed: u64,
    /// Sum of per-conversation message counts.
    pub total_messages: u64,
    /// Messages per conversation, rounded half up.
    pub average_messages: u64,
}

impl ConversationStats {
    /// Computes the aggregates over a listing.
    #[must_use]
    pub fn summarize(conversations: &[Conversation]) -> Self {
        let total = conversations.len() as u64;
        let total_messages: u64 = conversations.iter().map(|c| c.message_count).sum();
        let average_messages = if total == 0 {
            0
        } else {
            (total_messages + total / 2) / total
        };

        Self {
            total,
            open: conversations.iter().filter(|c| c.is_open()).count() as u64,
            pending: conversations.iter().filter(|c| c.is_pending()).count() as u64,
            closed: conversations.iter().filter(|c| c.is_closed()).count() as u64,
            total_messages,
            average_messages,
        }
    }
}
