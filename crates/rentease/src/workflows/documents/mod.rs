pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;

pub use domain::{Document, DocumentId, ReviewStatus, SignedDownload};
pub use router::documents_router;
pub use service::{DocumentService, DocumentServiceError, UploadRequest};
pub use storage::{StorageError, StorageGateway};
