use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, UserId, UserRole};
use crate::workflows::store::RepositoryError;

use super::domain::{
    DashboardStats, Lease, LeaseId, LeaseWithProperty, PaymentDue, PaymentId, PaymentStatus,
    Property, PropertyId, PropertyWithLeases,
};
use super::policy;
use super::repository::{LeaseRepository, PaymentRepository, PropertyRepository};
use super::schedule;

/// New property submitted by a landlord.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
}

/// Tenant assignment creating a lease on a landlord-owned property.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLease {
    pub tenant_id: UserId,
    pub property_id: PropertyId,
    pub monthly_rent: u32,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
}

/// Request to generate a monthly rent schedule for a lease.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub lease_id: LeaseId,
    pub start_date: NaiveDate,
    pub months: u32,
}

/// Payment details stamped onto an obligation when it is recorded.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPayment {
    pub payment_id: PaymentId,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

/// Role-shaped listing returned by the `properties` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PropertiesView {
    Landlord(Vec<PropertyWithLeases>),
    Tenant(Vec<LeaseWithProperty>),
}

/// Service composing the property, lease, and payment repositories.
pub struct RentService<P, L, Pay> {
    properties: Arc<P>,
    leases: Arc<L>,
    payments: Arc<Pay>,
}

impl<P, L, Pay> RentService<P, L, Pay>
where
    P: PropertyRepository + 'static,
    L: LeaseRepository + 'static,
    Pay: PaymentRepository + 'static,
{
    pub fn new(properties: Arc<P>, leases: Arc<L>, payments: Arc<Pay>) -> Self {
        Self {
            properties,
            leases,
            payments,
        }
    }

    pub fn create_property(
        &self,
        ctx: &AuthContext,
        submission: NewProperty,
    ) -> Result<Property, RentServiceError> {
        if !policy::may_create_property(ctx) {
            return Err(RentServiceError::Forbidden(
                "only landlords may create properties",
            ));
        }

        let property = Property {
            id: PropertyId(String::new()),
            landlord_id: ctx.user_id.clone(),
            name: submission.name,
            address: submission.address,
        };
        Ok(self.properties.insert(property)?)
    }

    pub fn properties(&self, ctx: &AuthContext) -> Result<PropertiesView, RentServiceError> {
        match ctx.role {
            UserRole::Landlord => {
                let owned = self.properties.owned_by(&ctx.user_id)?;
                let mut listings = Vec::with_capacity(owned.len());
                for property in owned {
                    let leases = self.leases.for_property(&property.id)?;
                    listings.push(PropertyWithLeases { property, leases });
                }
                Ok(PropertiesView::Landlord(listings))
            }
            UserRole::Tenant => {
                let leases = self.leases.for_tenant(&ctx.user_id)?;
                let mut listings = Vec::with_capacity(leases.len());
                for lease in leases {
                    let property = self
                        .properties
                        .fetch(&lease.property_id)?
                        .ok_or(RepositoryError::NotFound)?;
                    listings.push(LeaseWithProperty { lease, property });
                }
                Ok(PropertiesView::Tenant(listings))
            }
        }
    }

    /// Create a lease linking a tenant to an owned property. Rejects a
    /// second active lease for the same (tenant, property) pair.
    pub fn assign_tenant(
        &self,
        ctx: &AuthContext,
        assignment: NewLease,
    ) -> Result<Lease, RentServiceError> {
        let property = self
            .properties
            .fetch(&assignment.property_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !policy::may_manage_property(ctx, &property) {
            return Err(RentServiceError::Forbidden(
                "only the owning landlord may assign tenants",
            ));
        }
        if assignment.lease_end_date < assignment.lease_start_date {
            return Err(RentServiceError::Validation(
                "lease end date precedes start date".to_string(),
            ));
        }
        if self
            .leases
            .active_between(&assignment.tenant_id, &assignment.property_id)?
            .is_some()
        {
            return Err(RentServiceError::Repository(RepositoryError::Conflict));
        }

        let lease = Lease {
            id: LeaseId(String::new()),
            tenant_id: assignment.tenant_id,
            property_id: assignment.property_id,
            monthly_rent: assignment.monthly_rent,
            lease_start_date: assignment.lease_start_date,
            lease_end_date: assignment.lease_end_date,
            is_active: true,
        };
        Ok(self.leases.insert(lease)?)
    }

    /// Generate `months` pending obligations one calendar month apart,
    /// inserted as a single all-or-nothing batch.
    pub fn generate_schedule(
        &self,
        ctx: &AuthContext,
        request: ScheduleRequest,
    ) -> Result<Vec<PaymentDue>, RentServiceError> {
        if request.months == 0 {
            return Err(RentServiceError::Validation(
                "schedule must cover at least one month".to_string(),
            ));
        }

        let lease = self
            .leases
            .fetch(&request.lease_id)?
            .ok_or(RepositoryError::NotFound)?;
        let property = self
            .properties
            .fetch(&lease.property_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !policy::may_manage_property(ctx, &property) {
            return Err(RentServiceError::Forbidden(
                "only the owning landlord may generate a rent schedule",
            ));
        }

        let drafts = schedule::draft_schedule(
            &lease.id,
            request.start_date,
            request.months,
            lease.monthly_rent,
        );
        Ok(self.payments.insert_batch(drafts)?)
    }

    /// Record a payment against an obligation. The overwrite is deliberate:
    /// a late payment moves overdue -> paid, and re-recording an already
    /// paid row restamps it without error.
    pub fn record_payment(
        &self,
        ctx: &AuthContext,
        record: RecordPayment,
        today: NaiveDate,
    ) -> Result<PaymentDue, RentServiceError> {
        let mut payment = self
            .payments
            .fetch(&record.payment_id)?
            .ok_or(RepositoryError::NotFound)?;
        let lease = self
            .leases
            .fetch(&payment.lease_id)?
            .ok_or(RepositoryError::NotFound)?;
        let property = self
            .properties
            .fetch(&lease.property_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !policy::may_record_payment(ctx, &lease, &property) {
            return Err(RentServiceError::Forbidden(
                "only a lease party may record this payment",
            ));
        }

        payment.status = PaymentStatus::Paid;
        payment.paid_date = Some(today);
        payment.payment_method = Some(record.payment_method);
        payment.transaction_id = record.transaction_id;
        payment.notes = record.notes;
        Ok(self.payments.update(payment)?)
    }

    /// Payments visible to the caller: a tenant's own obligations, or every
    /// obligation on leases of the landlord's properties. Due date
    /// descending.
    pub fn rent_payments(&self, ctx: &AuthContext) -> Result<Vec<PaymentDue>, RentServiceError> {
        let lease_ids = self.visible_lease_ids(ctx)?;
        Ok(self.payments.for_leases(&lease_ids)?)
    }

    pub fn dashboard_stats(
        &self,
        ctx: &AuthContext,
        today: NaiveDate,
    ) -> Result<DashboardStats, RentServiceError> {
        match ctx.role {
            UserRole::Landlord => self.landlord_stats(ctx, today),
            UserRole::Tenant => self.tenant_stats(ctx),
        }
    }

    fn landlord_stats(
        &self,
        ctx: &AuthContext,
        today: NaiveDate,
    ) -> Result<DashboardStats, RentServiceError> {
        let owned = self.properties.owned_by(&ctx.user_id)?;
        let mut active_leases = Vec::new();
        for property in &owned {
            let leases = self.leases.for_property(&property.id)?;
            active_leases.extend(leases.into_iter().filter(|lease| lease.is_active));
        }

        let lease_ids: Vec<LeaseId> = active_leases.iter().map(|lease| lease.id.clone()).collect();
        let month_payments: Vec<PaymentDue> = self
            .payments
            .for_leases(&lease_ids)?
            .into_iter()
            .filter(|payment| in_month(payment.due_date, today))
            .collect();

        let total_rent_expected = month_payments
            .iter()
            .map(|payment| u64::from(payment.amount))
            .sum();
        let total_rent_collected = month_payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Paid)
            .map(|payment| u64::from(payment.amount))
            .sum();
        let pending_payments = month_payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Pending)
            .count();
        let overdue_payments = month_payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Overdue)
            .count();

        Ok(DashboardStats::Landlord {
            total_properties: owned.len(),
            active_leases: active_leases.len(),
            total_rent_expected,
            total_rent_collected,
            pending_payments,
            overdue_payments,
        })
    }

    fn tenant_stats(&self, ctx: &AuthContext) -> Result<DashboardStats, RentServiceError> {
        let leases: Vec<Lease> = self
            .leases
            .for_tenant(&ctx.user_id)?
            .into_iter()
            .filter(|lease| lease.is_active)
            .collect();
        let lease_ids: Vec<LeaseId> = leases.iter().map(|lease| lease.id.clone()).collect();

        let recent: Vec<PaymentDue> = self
            .payments
            .for_leases(&lease_ids)?
            .into_iter()
            .take(6)
            .collect();
        let next_payment_due = recent
            .iter()
            .find(|payment| payment.status == PaymentStatus::Pending)
            .map(|payment| payment.due_date);

        Ok(DashboardStats::Tenant {
            active_leases: leases.len(),
            next_payment_due,
            recent_payments: recent.into_iter().take(5).collect(),
        })
    }

    fn visible_lease_ids(&self, ctx: &AuthContext) -> Result<Vec<LeaseId>, RentServiceError> {
        let leases = match ctx.role {
            UserRole::Tenant => self.leases.for_tenant(&ctx.user_id)?,
            UserRole::Landlord => {
                let mut all = Vec::new();
                for property in self.properties.owned_by(&ctx.user_id)? {
                    all.extend(self.leases.for_property(&property.id)?);
                }
                all
            }
        };
        Ok(leases.into_iter().map(|lease| lease.id).collect())
    }
}

fn in_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// Error raised by the rent lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum RentServiceError {
    #[error("operation not permitted: {0}")]
    Forbidden(&'static str),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
