use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Identifier wrapper for properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier wrapper for leases (tenant-property associations).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub String);

/// Identifier wrapper for scheduled rent obligations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub String);

/// A rental unit owned by a landlord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub landlord_id: UserId,
    pub name: String,
    pub address: String,
}

/// Association between a tenant and a property for a bounded period at a
/// fixed rent. At most one active lease may exist per (tenant, property).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub tenant_id: UserId,
    pub property_id: PropertyId,
    pub monthly_rent: u32,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub is_active: bool,
}

/// Lifecycle status of a scheduled rent obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

/// A scheduled rent obligation with a due date and lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDue {
    pub id: PaymentId,
    pub lease_id: LeaseId,
    pub amount: u32,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

impl PaymentDue {
    pub fn pending(lease_id: LeaseId, amount: u32, due_date: NaiveDate) -> Self {
        Self {
            id: PaymentId(String::new()),
            lease_id,
            amount,
            due_date,
            status: PaymentStatus::Pending,
            paid_date: None,
            payment_method: None,
            transaction_id: None,
            notes: None,
        }
    }
}

/// Landlord's view of a property together with its leases.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyWithLeases {
    pub property: Property,
    pub leases: Vec<Lease>,
}

/// Tenant's view of a lease together with the property it covers.
#[derive(Debug, Clone, Serialize)]
pub struct LeaseWithProperty {
    pub lease: Lease,
    pub property: Property,
}

/// Dashboard summary tailored to the caller's role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "role")]
pub enum DashboardStats {
    Landlord {
        total_properties: usize,
        active_leases: usize,
        total_rent_expected: u64,
        total_rent_collected: u64,
        pending_payments: usize,
        overdue_payments: usize,
    },
    Tenant {
        active_leases: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_payment_due: Option<NaiveDate>,
        recent_payments: Vec<PaymentDue>,
    },
}
