use crate::workflows::rent::domain::{LeaseId, PropertyId};
use crate::workflows::store::RepositoryError;

use super::domain::{Document, DocumentId};

/// Storage abstraction over the documents metadata table.
pub trait DocumentRepository: Send + Sync {
    fn insert(&self, document: Document) -> Result<Document, RepositoryError>;
    fn fetch(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError>;
    fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError>;
    /// Documents matching the given filters, newest first.
    fn list(
        &self,
        property: Option<&PropertyId>,
        lease: Option<&LeaseId>,
    ) -> Result<Vec<Document>, RepositoryError>;
}
