//! Shared failure vocabulary for the repository seams. The managed relational
//! store backs these traits in production; tests and the demo binary use
//! in-memory implementations.

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
