use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::workflows::rent::domain::PropertyId;

/// Identifier wrapper for messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// A directed message between two users, optionally scoped to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub property_id: Option<PropertyId>,
    pub content: String,
    pub attachment_url: Option<String>,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

/// One grouped conversation for the caller: the other party, the property
/// scope, the latest message, and how many received messages are unread.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub other_user_id: UserId,
    pub property_id: Option<PropertyId>,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: usize,
}
