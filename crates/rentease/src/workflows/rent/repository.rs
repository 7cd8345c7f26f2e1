use chrono::NaiveDate;

use crate::auth::UserId;
use crate::workflows::store::RepositoryError;

use super::domain::{Lease, LeaseId, PaymentDue, PaymentId, Property, PropertyId};

/// Storage abstraction over the properties table.
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn owned_by(&self, landlord_id: &UserId) -> Result<Vec<Property>, RepositoryError>;
}

/// Storage abstraction over the tenant-property association table.
pub trait LeaseRepository: Send + Sync {
    fn insert(&self, lease: Lease) -> Result<Lease, RepositoryError>;
    fn fetch(&self, id: &LeaseId) -> Result<Option<Lease>, RepositoryError>;
    fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Lease>, RepositoryError>;
    fn for_property(&self, property_id: &PropertyId) -> Result<Vec<Lease>, RepositoryError>;
    /// The active lease for a (tenant, property) pair, if one exists.
    fn active_between(
        &self,
        tenant_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<Option<Lease>, RepositoryError>;
}

/// Storage abstraction over the rent payments table.
pub trait PaymentRepository: Send + Sync {
    /// Insert a batch of drafted rows as one all-or-nothing operation,
    /// returning the stored rows with assigned identifiers.
    fn insert_batch(&self, drafts: Vec<PaymentDue>) -> Result<Vec<PaymentDue>, RepositoryError>;
    fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentDue>, RepositoryError>;
    fn update(&self, payment: PaymentDue) -> Result<PaymentDue, RepositoryError>;
    /// Payments for the given leases, due date descending.
    fn for_leases(&self, lease_ids: &[LeaseId]) -> Result<Vec<PaymentDue>, RepositoryError>;
    /// Flip every pending row with a due date strictly before `today` to
    /// overdue, returning the rows that changed. One conditional batch
    /// update against the store.
    fn mark_overdue_before(&self, today: NaiveDate) -> Result<Vec<PaymentDue>, RepositoryError>;
}
