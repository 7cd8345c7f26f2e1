use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::auth::AuthContext;
use crate::workflows::rent::domain::{LeaseId, PropertyId};
use crate::workflows::store::RepositoryError;

use super::domain::{Document, DocumentId, ReviewStatus, SignedDownload};
use super::policy;
use super::repository::DocumentRepository;
use super::storage::{StorageError, StorageGateway};

/// Signed download links stay valid for one hour.
const DOWNLOAD_URL_TTL_SECS: u64 = 3600;

static OBJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Object keys are namespaced by uploader so storage-level listing stays
/// per-user.
fn next_storage_key(uploader: &str, file_name: &str) -> String {
    let sequence = OBJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    match file_name.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => {
            format!("{uploader}/doc-{sequence:06}.{extension}")
        }
        _ => format!("{uploader}/doc-{sequence:06}"),
    }
}

/// Upload submitted with raw file bytes and metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: Option<String>,
    pub document_type: String,
    pub property_id: Option<PropertyId>,
    pub lease_id: Option<LeaseId>,
    pub file_name: String,
    pub mime_type: String,
    pub contents: Vec<u8>,
}

/// Service pairing the metadata table with the object-storage gateway.
pub struct DocumentService<D, S> {
    documents: Arc<D>,
    storage: Arc<S>,
}

impl<D, S> DocumentService<D, S>
where
    D: DocumentRepository + 'static,
    S: StorageGateway + 'static,
{
    pub fn new(documents: Arc<D>, storage: Arc<S>) -> Self {
        Self { documents, storage }
    }

    /// Store the object, then insert the metadata row. A failed insert
    /// compensates by removing the just-stored object so the two stores do
    /// not drift apart.
    pub fn upload(
        &self,
        ctx: &AuthContext,
        request: UploadRequest,
        now: DateTime<Utc>,
    ) -> Result<Document, DocumentServiceError> {
        if request.contents.is_empty() {
            return Err(DocumentServiceError::Validation(
                "no file provided".to_string(),
            ));
        }
        if request.file_name.trim().is_empty() {
            return Err(DocumentServiceError::Validation(
                "file name is required".to_string(),
            ));
        }

        let storage_key = next_storage_key(&ctx.user_id.0, &request.file_name);
        self.storage
            .store(&storage_key, &request.contents, &request.mime_type)?;

        let document = Document {
            id: DocumentId(String::new()),
            uploader_id: ctx.user_id.clone(),
            property_id: request.property_id,
            lease_id: request.lease_id,
            document_type: request.document_type,
            title: request
                .title
                .unwrap_or_else(|| request.file_name.clone()),
            storage_key: storage_key.clone(),
            file_name: request.file_name,
            file_size: request.contents.len() as u64,
            mime_type: request.mime_type,
            review_status: ReviewStatus::Pending,
            uploaded_at: now,
        };

        match self.documents.insert(document) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                if let Err(cleanup) = self.storage.remove(&storage_key) {
                    warn!(%storage_key, error = %cleanup, "failed to roll back stored object after metadata insert error");
                }
                Err(err.into())
            }
        }
    }

    pub fn list(
        &self,
        _ctx: &AuthContext,
        property: Option<&PropertyId>,
        lease: Option<&LeaseId>,
    ) -> Result<Vec<Document>, DocumentServiceError> {
        Ok(self.documents.list(property, lease)?)
    }

    /// Resolve a time-limited signed URL for direct client download.
    pub fn download(
        &self,
        _ctx: &AuthContext,
        id: &DocumentId,
    ) -> Result<SignedDownload, DocumentServiceError> {
        let document = self.documents.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let download_url = self
            .storage
            .signed_url(&document.storage_key, DOWNLOAD_URL_TTL_SECS)?;
        Ok(SignedDownload {
            download_url,
            file_name: document.file_name,
        })
    }

    /// Uploader-only. Object removal is best effort: a storage failure is
    /// logged and the metadata row is deleted regardless.
    pub fn delete(
        &self,
        ctx: &AuthContext,
        id: &DocumentId,
    ) -> Result<(), DocumentServiceError> {
        let document = self.documents.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if !policy::may_delete(ctx, &document) {
            return Err(DocumentServiceError::Forbidden(
                "only the uploader may delete this document",
            ));
        }

        if let Err(err) = self.storage.remove(&document.storage_key) {
            warn!(storage_key = %document.storage_key, error = %err, "storage removal failed; deleting metadata anyway");
        }
        Ok(self.documents.delete(id)?)
    }
}

/// Error raised by the document service.
#[derive(Debug, thiserror::Error)]
pub enum DocumentServiceError {
    #[error("operation not permitted: {0}")]
    Forbidden(&'static str),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
