use chrono::{Months, NaiveDate};

use super::domain::{LeaseId, PaymentDue};

/// Due dates for `months` consecutive monthly obligations starting at
/// `start`. Each date keeps the start's day-of-month; months too short for
/// that day clamp to their final day (calendar arithmetic, e.g. Jan 31 ->
/// Feb 28/29).
pub fn monthly_due_dates(start: NaiveDate, months: u32) -> Vec<NaiveDate> {
    (0..months)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .collect()
}

/// Draft one pending obligation per month for a lease. The rows carry no
/// identifiers yet; the repository assigns those on batch insert.
pub fn draft_schedule(
    lease_id: &LeaseId,
    start: NaiveDate,
    months: u32,
    monthly_amount: u32,
) -> Vec<PaymentDue> {
    monthly_due_dates(start, months)
        .into_iter()
        .map(|due_date| PaymentDue::pending(lease_id.clone(), monthly_amount, due_date))
        .collect()
}
