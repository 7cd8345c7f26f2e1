use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for identity-provider users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Role assigned to a profile at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Landlord,
    Tenant,
}

/// Caller identity resolved from a bearer credential, passed explicitly into
/// every service operation instead of living in ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: UserRole,
}

/// Seam for the external identity provider's token verification.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Extract the bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;
    let raw = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).expect("token"), "abc123");
    }

    #[test]
    fn accepts_raw_token_without_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc123"));
        assert_eq!(bearer_token(&headers).expect("token"), "abc123");
    }

    #[test]
    fn missing_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn empty_bearer_value_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredential)
        ));
    }
}
