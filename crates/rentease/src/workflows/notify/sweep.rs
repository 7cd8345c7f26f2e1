use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::workflows::rent::domain::{PaymentDue, PaymentId};
use crate::workflows::rent::repository::{
    LeaseRepository, PaymentRepository, PropertyRepository,
};
use crate::workflows::store::RepositoryError;

use super::directory::UserDirectory;
use super::mailer::{EmailMessage, Mailer};
use super::templates;

/// Per-payment notification result from one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum SweepDispatch {
    Sent(String),
    SkippedNoEmail,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub payment_id: PaymentId,
    pub outcome: SweepDispatch,
}

/// Summary of one sweep: how many rows went overdue and what happened to
/// each notice.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub overdue_count: usize,
    pub emails_sent: usize,
    pub outcomes: Vec<SweepOutcome>,
}

/// Periodic sweep flipping past-due pending payments to overdue and fanning
/// out notices through a concurrency-limited dispatcher. The flip is the
/// operation of record; notification failures are isolated per recipient
/// and never fail the sweep.
pub struct OverdueSweeper<Pay, L, P, D, M> {
    payments: Arc<Pay>,
    leases: Arc<L>,
    properties: Arc<P>,
    directory: Arc<D>,
    mailer: Arc<M>,
    from_address: String,
    max_concurrent_sends: usize,
}

impl<Pay, L, P, D, M> OverdueSweeper<Pay, L, P, D, M>
where
    Pay: PaymentRepository + 'static,
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
{
    pub fn new(
        payments: Arc<Pay>,
        leases: Arc<L>,
        properties: Arc<P>,
        directory: Arc<D>,
        mailer: Arc<M>,
        from_address: String,
        max_concurrent_sends: usize,
    ) -> Self {
        Self {
            payments,
            leases,
            properties,
            directory,
            mailer,
            from_address,
            max_concurrent_sends: max_concurrent_sends.max(1),
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<SweepReport, RepositoryError> {
        let flipped = self.payments.mark_overdue_before(today)?;
        info!(count = flipped.len(), %today, "overdue sweep flipped pending payments");

        let mut slots: Vec<Option<SweepDispatch>> = vec![None; flipped.len()];
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_sends));
        let mut join_set: JoinSet<(usize, SweepDispatch)> = JoinSet::new();

        for (index, payment) in flipped.iter().enumerate() {
            match self.prepare_notice(payment) {
                Ok(Some(message)) => {
                    let mailer = self.mailer.clone();
                    let semaphore = semaphore.clone();
                    let payment_id = payment.id.clone();
                    join_set.spawn(async move {
                        let permit = semaphore.acquire_owned().await;
                        let outcome = match permit {
                            Ok(permit) => {
                                let result = tokio::task::spawn_blocking(move || {
                                    let _permit = permit;
                                    mailer.send(message)
                                })
                                .await;
                                match result {
                                    Ok(Ok(email_id)) => SweepDispatch::Sent(email_id),
                                    Ok(Err(err)) => {
                                        warn!(payment_id = %payment_id.0, error = %err, "overdue notice dispatch failed");
                                        SweepDispatch::Failed(err.to_string())
                                    }
                                    Err(err) => {
                                        warn!(payment_id = %payment_id.0, error = %err, "overdue notice task aborted");
                                        SweepDispatch::Failed(err.to_string())
                                    }
                                }
                            }
                            Err(err) => SweepDispatch::Failed(err.to_string()),
                        };
                        (index, outcome)
                    });
                }
                Ok(None) => {
                    warn!(payment_id = %payment.id.0, "tenant has no email on file; skipping overdue notice");
                    slots[index] = Some(SweepDispatch::SkippedNoEmail);
                }
                Err(reason) => {
                    warn!(payment_id = %payment.id.0, error = %reason, "unable to prepare overdue notice");
                    slots[index] = Some(SweepDispatch::Failed(reason));
                }
            }
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(err) => warn!(error = %err, "overdue notice task panicked"),
            }
        }

        let outcomes: Vec<SweepOutcome> = flipped
            .iter()
            .zip(slots)
            .map(|(payment, slot)| SweepOutcome {
                payment_id: payment.id.clone(),
                outcome: slot
                    .unwrap_or_else(|| SweepDispatch::Failed("dispatch task lost".to_string())),
            })
            .collect();
        let emails_sent = outcomes
            .iter()
            .filter(|outcome| matches!(outcome.outcome, SweepDispatch::Sent(_)))
            .count();

        Ok(SweepReport {
            overdue_count: flipped.len(),
            emails_sent,
            outcomes,
        })
    }

    /// Resolve recipient and render the notice. `Ok(None)` means the tenant
    /// has no email on file and the notice is skipped.
    fn prepare_notice(&self, payment: &PaymentDue) -> Result<Option<EmailMessage>, String> {
        let lease = self
            .leases
            .fetch(&payment.lease_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| "lease not found".to_string())?;
        let property = self
            .properties
            .fetch(&lease.property_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| "property not found".to_string())?;
        let tenant = self
            .directory
            .profile(&lease.tenant_id)
            .map_err(|err| err.to_string())?;

        let Some(to) = tenant.email else {
            return Ok(None);
        };

        let rendered = templates::overdue_notice(
            &tenant.first_name,
            &property.name,
            &property.address,
            payment.amount,
            payment.due_date,
        );
        Ok(Some(EmailMessage {
            from: self.from_address.clone(),
            to: vec![to],
            subject: rendered.subject,
            html_body: rendered.html_body,
        }))
    }
}
