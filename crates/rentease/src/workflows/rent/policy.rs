//! Authorization predicates for the rent lifecycle, evaluated before any
//! mutation and independent of the queries that fetch data.

use crate::auth::{AuthContext, UserRole};

use super::domain::{Lease, Property};

/// Only landlords may create properties.
pub fn may_create_property(ctx: &AuthContext) -> bool {
    ctx.role == UserRole::Landlord
}

/// Only the owning landlord may manage a property (assign tenants,
/// generate schedules).
pub fn may_manage_property(ctx: &AuthContext, property: &Property) -> bool {
    ctx.role == UserRole::Landlord && property.landlord_id == ctx.user_id
}

/// A payment may be recorded by the lease's tenant or by the owning
/// landlord of the leased property.
pub fn may_record_payment(ctx: &AuthContext, lease: &Lease, property: &Property) -> bool {
    lease.tenant_id == ctx.user_id || property.landlord_id == ctx.user_id
}
