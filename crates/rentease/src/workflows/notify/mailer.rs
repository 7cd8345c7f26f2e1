use serde::{Deserialize, Serialize};

/// One outbound transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Seam for the transactional email provider. Implementations return the
/// provider-assigned message identifier.
pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> Result<String, MailError>;
}

/// Email dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email transport unavailable: {0}")]
    Transport(String),
    #[error("email rejected by provider: {0}")]
    Rejected(String),
}
