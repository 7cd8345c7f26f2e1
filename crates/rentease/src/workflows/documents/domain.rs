use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::workflows::rent::domain::{LeaseId, PropertyId};

/// Identifier wrapper for stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Review state applied by a landlord after upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
}

/// Metadata row for an uploaded file; the bytes live in object storage
/// under `storage_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub uploader_id: UserId,
    pub property_id: Option<PropertyId>,
    pub lease_id: Option<LeaseId>,
    pub document_type: String,
    pub title: String,
    pub storage_key: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub review_status: ReviewStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// Time-limited download capability issued by object storage.
#[derive(Debug, Clone, Serialize)]
pub struct SignedDownload {
    pub download_url: String,
    pub file_name: String,
}
