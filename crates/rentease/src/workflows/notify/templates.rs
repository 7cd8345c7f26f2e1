//! HTML bodies for the four transactional email templates. Rendering is
//! pure so the copy can be asserted in isolation; all interpolated values
//! are escaped.

use chrono::NaiveDate;
use std::fmt::Write as _;

/// Subject line plus rendered HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
}

/// Reminder sent to the tenant ahead of a due date.
pub fn rent_reminder(
    tenant_first: &str,
    property_name: &str,
    property_address: &str,
    monthly_rent: u32,
    days_until_due: u32,
    landlord_first: &str,
    landlord_last: &str,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Rent Payment Reminder</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(tenant_first)));
    write_line(
        &mut html,
        format_args!(
            "<p>This is a friendly reminder that your rent payment of <strong>${}</strong> for <strong>{}</strong> is due in {} day(s).</p>",
            monthly_rent,
            escape_html(property_name),
            days_until_due
        ),
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Property:</strong> {}</p>", escape_html(property_address)),
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Amount:</strong> ${monthly_rent}</p>"),
    );
    push_line(
        &mut html,
        "<p>Please ensure your payment is submitted on time to avoid any late fees.</p>",
    );
    write_line(
        &mut html,
        format_args!(
            "<p>If you have any questions, please contact your landlord {} {}.</p>",
            escape_html(landlord_first),
            escape_html(landlord_last)
        ),
    );
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("Rent Payment Reminder - {property_name}"),
        html_body: html,
    }
}

/// Confirmation sent to the tenant once a payment is recorded.
pub fn payment_confirmation_tenant(
    tenant_first: &str,
    property_address: &str,
    amount: u32,
    paid_date: NaiveDate,
    transaction_id: Option<&str>,
    property_name: &str,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Payment Confirmation</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(tenant_first)));
    push_line(&mut html, "<p>We have received your rent payment. Thank you!</p>");
    payment_details(&mut html, property_address, amount, paid_date, transaction_id);
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("Payment Confirmation - {property_name}"),
        html_body: html,
    }
}

/// Receipt notification sent to the landlord for the same payment.
pub fn payment_received_landlord(
    landlord_first: &str,
    tenant_first: &str,
    tenant_last: &str,
    property_address: &str,
    amount: u32,
    paid_date: NaiveDate,
    transaction_id: Option<&str>,
    property_name: &str,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Rent Payment Received</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(landlord_first)));
    write_line(
        &mut html,
        format_args!(
            "<p>You have received a rent payment from {} {}.</p>",
            escape_html(tenant_first),
            escape_html(tenant_last)
        ),
    );
    payment_details(&mut html, property_address, amount, paid_date, transaction_id);
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("Rent Payment Received - {property_name}"),
        html_body: html,
    }
}

/// Expiry notice sent to the tenant.
pub fn lease_expiry_tenant(
    tenant_first: &str,
    property_name: &str,
    property_address: &str,
    days_until_expiry: u32,
    lease_end_date: NaiveDate,
    landlord_first: &str,
    landlord_last: &str,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Lease Expiry Notice</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(tenant_first)));
    write_line(
        &mut html,
        format_args!(
            "<p>Your lease for <strong>{}</strong> will expire in {} day(s) on {}.</p>",
            escape_html(property_name),
            days_until_expiry,
            lease_end_date.format("%B %d, %Y")
        ),
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Property:</strong> {}</p>", escape_html(property_address)),
    );
    push_line(
        &mut html,
        "<p>Please contact your landlord to discuss lease renewal or move-out arrangements.</p>",
    );
    write_line(
        &mut html,
        format_args!(
            "<p>Landlord: {} {}</p>",
            escape_html(landlord_first),
            escape_html(landlord_last)
        ),
    );
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("Lease Expiry Notice - {property_name}"),
        html_body: html,
    }
}

/// Expiry notice sent to the landlord.
pub fn lease_expiry_landlord(
    landlord_first: &str,
    tenant_first: &str,
    tenant_last: &str,
    property_name: &str,
    property_address: &str,
    days_until_expiry: u32,
    lease_end_date: NaiveDate,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Tenant Lease Expiry Notice</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(landlord_first)));
    write_line(
        &mut html,
        format_args!(
            "<p>The lease for your tenant {} {} at <strong>{}</strong> will expire in {} day(s) on {}.</p>",
            escape_html(tenant_first),
            escape_html(tenant_last),
            escape_html(property_name),
            days_until_expiry,
            lease_end_date.format("%B %d, %Y")
        ),
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Property:</strong> {}</p>", escape_html(property_address)),
    );
    push_line(
        &mut html,
        "<p>Please reach out to discuss lease renewal or move-out arrangements.</p>",
    );
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("Tenant Lease Expiry Notice - {property_name}"),
        html_body: html,
    }
}

/// Notice dispatched for each payment the sweep flips to overdue.
pub fn overdue_notice(
    tenant_first: &str,
    property_name: &str,
    property_address: &str,
    amount: u32,
    due_date: NaiveDate,
) -> RenderedEmail {
    let mut html = String::new();
    push_line(&mut html, "<h1>Overdue Rent Payment Notice</h1>");
    write_line(&mut html, format_args!("<p>Hello {},</p>", escape_html(tenant_first)));
    push_line(
        &mut html,
        "<p><strong style=\"color: red;\">Your rent payment is now OVERDUE.</strong></p>",
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Property:</strong> {}</p>", escape_html(property_address)),
    );
    write_line(
        &mut html,
        format_args!("<p><strong>Amount Due:</strong> ${amount}</p>"),
    );
    write_line(
        &mut html,
        format_args!(
            "<p><strong>Due Date:</strong> {}</p>",
            due_date.format("%B %d, %Y")
        ),
    );
    push_line(
        &mut html,
        "<p>Please submit your payment immediately to avoid additional late fees and potential legal action.</p>",
    );
    push_line(&mut html, "<p>Best regards,<br>The RentEase Team</p>");

    RenderedEmail {
        subject: format!("OVERDUE: Rent Payment - {property_name}"),
        html_body: html,
    }
}

fn payment_details(
    html: &mut String,
    property_address: &str,
    amount: u32,
    paid_date: NaiveDate,
    transaction_id: Option<&str>,
) {
    write_line(
        html,
        format_args!("<p><strong>Property:</strong> {}</p>", escape_html(property_address)),
    );
    write_line(html, format_args!("<p><strong>Amount:</strong> ${amount}</p>"));
    write_line(
        html,
        format_args!(
            "<p><strong>Payment Date:</strong> {}</p>",
            paid_date.format("%B %d, %Y")
        ),
    );
    write_line(
        html,
        format_args!(
            "<p><strong>Transaction ID:</strong> {}</p>",
            transaction_id.map(escape_html).unwrap_or_else(|| "N/A".to_string())
        ),
    );
}

fn push_line(html: &mut String, line: &str) {
    html.push_str(line);
    html.push('\n');
}

fn write_line(html: &mut String, args: std::fmt::Arguments<'_>) {
    html.write_fmt(args).expect("write template line");
    html.push('\n');
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
