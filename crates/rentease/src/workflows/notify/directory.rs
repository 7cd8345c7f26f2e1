use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Profile record resolved through the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Absent when the identity provider has no verified address on file.
    pub email: Option<String>,
}

/// Seam for identity-provider profile lookups.
pub trait UserDirectory: Send + Sync {
    fn profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError>;
}

/// Profile resolution error.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("no profile found for user")]
    NotFound,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}
