//! Authorization predicates for document management.

use crate::auth::AuthContext;

use super::domain::Document;

/// Only the uploader may delete a document.
pub fn may_delete(ctx: &AuthContext, document: &Document) -> bool {
    document.uploader_id == ctx.user_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{UserId, UserRole};
    use crate::workflows::documents::domain::{DocumentId, ReviewStatus};
    use chrono::Utc;

    fn document(uploader: &str) -> Document {
        Document {
            id: DocumentId("doc-1".to_string()),
            uploader_id: UserId(uploader.to_string()),
            property_id: None,
            lease_id: None,
            document_type: "lease_agreement".to_string(),
            title: "Lease".to_string(),
            storage_key: "tenant-1/doc-000001.pdf".to_string(),
            file_name: "lease.pdf".to_string(),
            file_size: 1024,
            mime_type: "application/pdf".to_string(),
            review_status: ReviewStatus::Pending,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn only_the_uploader_may_delete() {
        let ctx = AuthContext {
            user_id: UserId("tenant-1".to_string()),
            role: UserRole::Tenant,
        };
        assert!(may_delete(&ctx, &document("tenant-1")));
        assert!(!may_delete(&ctx, &document("landlord-1")));
    }
}
