use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, UserId};
use crate::workflows::rent::domain::{Lease, PropertyId};
use crate::workflows::rent::repository::{LeaseRepository, PropertyRepository};
use crate::workflows::store::RepositoryError;

use super::domain::{ConversationView, Message, MessageId};
use super::policy;
use super::repository::MessageRepository;

/// Message submitted by the sender.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub receiver_id: UserId,
    pub property_id: Option<PropertyId>,
    pub content: String,
    pub attachment_url: Option<String>,
}

/// Unread tally returned by the `unread-count` action.
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCount {
    pub unread_count: usize,
}

/// Service composing the message store with the lease records that gate who
/// may talk to whom.
pub struct MessagingService<M, L, P> {
    messages: Arc<M>,
    leases: Arc<L>,
    properties: Arc<P>,
}

impl<M, L, P> MessagingService<M, L, P>
where
    M: MessageRepository + 'static,
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
{
    pub fn new(messages: Arc<M>, leases: Arc<L>, properties: Arc<P>) -> Self {
        Self {
            messages,
            leases,
            properties,
        }
    }

    /// Persist a message once a lease row connecting sender and receiver is
    /// found. No qualifying lease means the message is rejected.
    pub fn send(
        &self,
        ctx: &AuthContext,
        submission: SendMessage,
        now: DateTime<Utc>,
    ) -> Result<Message, MessagingServiceError> {
        if submission.content.trim().is_empty() {
            return Err(MessagingServiceError::Validation(
                "message content is required".to_string(),
            ));
        }
        if !self.connected(
            &ctx.user_id,
            &submission.receiver_id,
            submission.property_id.as_ref(),
        )? {
            return Err(MessagingServiceError::Forbidden(
                "no lease connects sender and receiver for this property",
            ));
        }

        let message = Message {
            id: MessageId(String::new()),
            sender_id: ctx.user_id.clone(),
            receiver_id: submission.receiver_id,
            property_id: submission.property_id,
            content: submission.content,
            attachment_url: submission.attachment_url,
            is_read: false,
            sent_at: now,
        };
        Ok(self.messages.insert(message)?)
    }

    /// Conversations for the caller grouped by (other user, property),
    /// newest first, with per-conversation unread counts.
    pub fn conversations(
        &self,
        ctx: &AuthContext,
    ) -> Result<Vec<ConversationView>, MessagingServiceError> {
        let history = self.messages.involving(&ctx.user_id)?;

        let mut views: Vec<ConversationView> = Vec::new();
        let mut index: HashMap<(UserId, Option<PropertyId>), usize> = HashMap::new();
        for message in history {
            let other = if message.sender_id == ctx.user_id {
                message.receiver_id.clone()
            } else {
                message.sender_id.clone()
            };
            let key = (other.clone(), message.property_id.clone());
            let slot = *index.entry(key).or_insert_with(|| {
                views.push(ConversationView {
                    other_user_id: other,
                    property_id: message.property_id.clone(),
                    last_message: message.content.clone(),
                    last_message_time: message.sent_at,
                    unread_count: 0,
                });
                views.len() - 1
            });
            if message.receiver_id == ctx.user_id && !message.is_read {
                views[slot].unread_count += 1;
            }
        }
        Ok(views)
    }

    /// The thread between the caller and another user, oldest first.
    pub fn messages(
        &self,
        ctx: &AuthContext,
        other: &UserId,
        property: Option<&PropertyId>,
    ) -> Result<Vec<Message>, MessagingServiceError> {
        Ok(self.messages.between(&ctx.user_id, other, property)?)
    }

    /// Only the receiver may mark a message read.
    pub fn mark_read(
        &self,
        ctx: &AuthContext,
        message_id: &MessageId,
    ) -> Result<Message, MessagingServiceError> {
        let mut message = self
            .messages
            .fetch(message_id)?
            .ok_or(RepositoryError::NotFound)?;
        if message.receiver_id != ctx.user_id {
            return Err(MessagingServiceError::Forbidden(
                "only the receiver may mark a message read",
            ));
        }
        message.is_read = true;
        Ok(self.messages.update(message)?)
    }

    pub fn unread_count(&self, ctx: &AuthContext) -> Result<UnreadCount, MessagingServiceError> {
        Ok(UnreadCount {
            unread_count: self.messages.unread_count(&ctx.user_id)?,
        })
    }

    /// Evidence check: some active lease must connect the two parties, with
    /// one as its tenant and the other as the property's landlord. When a
    /// property scope is supplied the lease must sit on that property.
    fn connected(
        &self,
        sender: &UserId,
        receiver: &UserId,
        property: Option<&PropertyId>,
    ) -> Result<bool, MessagingServiceError> {
        let mut candidates: Vec<Lease> = self.leases.for_tenant(sender)?;
        candidates.extend(self.leases.for_tenant(receiver)?);

        for lease in candidates {
            if let Some(scope) = property {
                if lease.property_id != *scope {
                    continue;
                }
            }
            let Some(prop) = self.properties.fetch(&lease.property_id)? else {
                continue;
            };
            if policy::lease_connects(&lease, &prop, sender, receiver) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Error raised by the messaging service.
#[derive(Debug, thiserror::Error)]
pub enum MessagingServiceError {
    #[error("operation not permitted: {0}")]
    Forbidden(&'static str),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
