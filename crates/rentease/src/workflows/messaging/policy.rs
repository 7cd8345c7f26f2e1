//! Messaging authorization: a message is only allowed between two users
//! connected by a single lease row, one party as the lease's tenant and the
//! other as the leased property's landlord. Checking each party against
//! *some* lease independently would admit unrelated pairs, so the predicate
//! insists on the same row.

use crate::auth::UserId;
use crate::workflows::rent::domain::{Lease, Property};

/// True when `lease` (on `property`) connects exactly this sender/receiver
/// pair, in either direction.
pub fn lease_connects(lease: &Lease, property: &Property, a: &UserId, b: &UserId) -> bool {
    if !lease.is_active || lease.property_id != property.id {
        return false;
    }
    (lease.tenant_id == *a && property.landlord_id == *b)
        || (lease.tenant_id == *b && property.landlord_id == *a)
}
