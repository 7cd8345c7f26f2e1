use crate::auth::UserId;
use crate::workflows::rent::domain::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::{Message, MessageId};

/// Storage abstraction over the messages table.
pub trait MessageRepository: Send + Sync {
    fn insert(&self, message: Message) -> Result<Message, RepositoryError>;
    fn fetch(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError>;
    fn update(&self, message: Message) -> Result<Message, RepositoryError>;
    /// Every message sent or received by `user`, newest first.
    fn involving(&self, user: &UserId) -> Result<Vec<Message>, RepositoryError>;
    /// The thread between two users, oldest first, optionally scoped to a
    /// property.
    fn between(
        &self,
        user: &UserId,
        other: &UserId,
        property: Option<&PropertyId>,
    ) -> Result<Vec<Message>, RepositoryError>;
    /// Count of unread messages addressed to `user`.
    fn unread_count(&self, user: &UserId) -> Result<usize, RepositoryError>;
}
