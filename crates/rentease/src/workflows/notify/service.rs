use std::sync::Arc;

use serde::Serialize;

use crate::auth::UserId;
use crate::workflows::rent::domain::{Lease, LeaseId, PaymentId, Property};
use crate::workflows::rent::repository::{
    LeaseRepository, PaymentRepository, PropertyRepository,
};
use crate::workflows::store::RepositoryError;

use super::directory::{DirectoryError, UserDirectory, UserProfile};
use super::mailer::{EmailMessage, MailError, Mailer};
use super::templates;

/// Provider message identifiers for a single-recipient dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub success: bool,
    pub email_id: String,
}

/// Provider message identifiers when both lease parties are notified.
#[derive(Debug, Clone, Serialize)]
pub struct PairedDispatchReceipt {
    pub success: bool,
    pub tenant_email_id: String,
    pub landlord_email_id: String,
}

/// On-demand notification sends: reminder, confirmation, and expiry
/// notices. A recipient without a resolvable email address is a hard error
/// here; only the batch sweep treats that as a skip.
pub struct NotificationService<L, P, Pay, D, M> {
    leases: Arc<L>,
    properties: Arc<P>,
    payments: Arc<Pay>,
    directory: Arc<D>,
    mailer: Arc<M>,
    from_address: String,
}

impl<L, P, Pay, D, M> NotificationService<L, P, Pay, D, M>
where
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    Pay: PaymentRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
{
    pub fn new(
        leases: Arc<L>,
        properties: Arc<P>,
        payments: Arc<Pay>,
        directory: Arc<D>,
        mailer: Arc<M>,
        from_address: String,
    ) -> Self {
        Self {
            leases,
            properties,
            payments,
            directory,
            mailer,
            from_address,
        }
    }

    pub fn send_rent_reminder(
        &self,
        lease_id: &LeaseId,
        days_until_due: u32,
    ) -> Result<DispatchReceipt, NotifyError> {
        let (lease, property) = self.lease_with_property(lease_id)?;
        let tenant = self.directory.profile(&lease.tenant_id)?;
        let landlord = self.directory.profile(&property.landlord_id)?;
        let to = required_email(&tenant)?;

        let rendered = templates::rent_reminder(
            &tenant.first_name,
            &property.name,
            &property.address,
            lease.monthly_rent,
            days_until_due,
            &landlord.first_name,
            &landlord.last_name,
        );
        let email_id = self.mailer.send(EmailMessage {
            from: self.from_address.clone(),
            to: vec![to],
            subject: rendered.subject,
            html_body: rendered.html_body,
        })?;

        Ok(DispatchReceipt {
            success: true,
            email_id,
        })
    }

    pub fn send_payment_confirmation(
        &self,
        payment_id: &PaymentId,
    ) -> Result<PairedDispatchReceipt, NotifyError> {
        let payment = self
            .payments
            .fetch(payment_id)?
            .ok_or(RepositoryError::NotFound)?;
        let paid_date = payment.paid_date.ok_or_else(|| {
            NotifyError::Validation("payment has not been recorded as paid".to_string())
        })?;
        let (lease, property) = self.lease_with_property(&payment.lease_id)?;
        let tenant = self.directory.profile(&lease.tenant_id)?;
        let landlord = self.directory.profile(&property.landlord_id)?;
        let tenant_to = required_email(&tenant)?;
        let landlord_to = required_email(&landlord)?;
        let transaction_id = payment.transaction_id.as_deref();

        let tenant_rendered = templates::payment_confirmation_tenant(
            &tenant.first_name,
            &property.address,
            payment.amount,
            paid_date,
            transaction_id,
            &property.name,
        );
        let tenant_email_id = self.mailer.send(EmailMessage {
            from: self.from_address.clone(),
            to: vec![tenant_to],
            subject: tenant_rendered.subject,
            html_body: tenant_rendered.html_body,
        })?;

        let landlord_rendered = templates::payment_received_landlord(
            &landlord.first_name,
            &tenant.first_name,
            &tenant.last_name,
            &property.address,
            payment.amount,
            paid_date,
            transaction_id,
            &property.name,
        );
        let landlord_email_id = self.mailer.send(EmailMessage {
            from: self.from_address.clone(),
            to: vec![landlord_to],
            subject: landlord_rendered.subject,
            html_body: landlord_rendered.html_body,
        })?;

        Ok(PairedDispatchReceipt {
            success: true,
            tenant_email_id,
            landlord_email_id,
        })
    }

    pub fn send_lease_expiry_notice(
        &self,
        lease_id: &LeaseId,
        days_until_expiry: u32,
    ) -> Result<PairedDispatchReceipt, NotifyError> {
        let (lease, property) = self.lease_with_property(lease_id)?;
        let tenant = self.directory.profile(&lease.tenant_id)?;
        let landlord = self.directory.profile(&property.landlord_id)?;
        let tenant_to = required_email(&tenant)?;
        let landlord_to = required_email(&landlord)?;

        let tenant_rendered = templates::lease_expiry_tenant(
            &tenant.first_name,
            &property.name,
            &property.address,
            days_until_expiry,
            lease.lease_end_date,
            &landlord.first_name,
            &landlord.last_name,
        );
        let tenant_email_id = self.mailer.send(EmailMessage {
            from: self.from_address.clone(),
            to: vec![tenant_to],
            subject: tenant_rendered.subject,
            html_body: tenant_rendered.html_body,
        })?;

        let landlord_rendered = templates::lease_expiry_landlord(
            &landlord.first_name,
            &tenant.first_name,
            &tenant.last_name,
            &property.name,
            &property.address,
            days_until_expiry,
            lease.lease_end_date,
        );
        let landlord_email_id = self.mailer.send(EmailMessage {
            from: self.from_address.clone(),
            to: vec![landlord_to],
            subject: landlord_rendered.subject,
            html_body: landlord_rendered.html_body,
        })?;

        Ok(PairedDispatchReceipt {
            success: true,
            tenant_email_id,
            landlord_email_id,
        })
    }

    fn lease_with_property(&self, lease_id: &LeaseId) -> Result<(Lease, Property), NotifyError> {
        let lease = self
            .leases
            .fetch(lease_id)?
            .ok_or(RepositoryError::NotFound)?;
        let property = self
            .properties
            .fetch(&lease.property_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok((lease, property))
    }
}

fn required_email(profile: &UserProfile) -> Result<String, NotifyError> {
    profile
        .email
        .clone()
        .ok_or_else(|| NotifyError::MissingEmail {
            user_id: profile.user_id.clone(),
        })
}

/// Error raised by the notification service.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("no email found for user {}", user_id.0)]
    MissingEmail { user_id: UserId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Mail(#[from] MailError),
}
