pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ConversationView, Message, MessageId};
pub use router::messaging_router;
pub use service::{MessagingService, MessagingServiceError, SendMessage};
