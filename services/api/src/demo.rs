use crate::infra::{
    InMemoryDirectory, InMemoryDocumentRepository, InMemoryLeaseRepository,
    InMemoryMessageRepository, InMemoryPaymentRepository, InMemoryPropertyRepository,
    InMemoryStorage, RecordingMailer,
};
use chrono::{Local, Months, NaiveDate, Utc};
use clap::Args;
use rentease::auth::{AuthContext, UserId, UserRole};
use rentease::error::AppError;
use rentease::workflows::documents::{DocumentService, UploadRequest};
use rentease::workflows::messaging::{MessagingService, SendMessage};
use rentease::workflows::notify::{NotificationService, OverdueSweeper, UserProfile};
use rentease::workflows::rent::service::{NewLease, NewProperty, RecordPayment, ScheduleRequest};
use rentease::workflows::rent::RentService;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Override the sweep date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Maximum number of overdue notices sent concurrently
    #[arg(long, default_value_t = 4)]
    pub(crate) max_concurrent_sends: usize,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let from_address = "RentEase <noreply@rentease.app>".to_string();

    let properties = Arc::new(InMemoryPropertyRepository::default());
    let leases = Arc::new(InMemoryLeaseRepository::default());
    let payments = Arc::new(InMemoryPaymentRepository::default());
    let messages = Arc::new(InMemoryMessageRepository::default());
    let document_records = Arc::new(InMemoryDocumentRepository::default());
    let storage = Arc::new(InMemoryStorage::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let mailer = Arc::new(RecordingMailer::default());

    let landlord = AuthContext {
        user_id: UserId("landlord-demo".to_string()),
        role: UserRole::Landlord,
    };
    let tenant = AuthContext {
        user_id: UserId("tenant-demo".to_string()),
        role: UserRole::Tenant,
    };
    directory.upsert(UserProfile {
        user_id: landlord.user_id.clone(),
        first_name: "Dana".to_string(),
        last_name: "Whitfield".to_string(),
        email: Some("dana.whitfield@example.com".to_string()),
    });
    directory.upsert(UserProfile {
        user_id: tenant.user_id.clone(),
        first_name: "Marcus".to_string(),
        last_name: "Reed".to_string(),
        email: Some("marcus.reed@example.com".to_string()),
    });

    let rent = Arc::new(RentService::new(
        properties.clone(),
        leases.clone(),
        payments.clone(),
    ));
    let messaging = Arc::new(MessagingService::new(
        messages,
        leases.clone(),
        properties.clone(),
    ));
    let documents = Arc::new(DocumentService::new(document_records, storage.clone()));
    let notifications = Arc::new(NotificationService::new(
        leases.clone(),
        properties.clone(),
        payments.clone(),
        directory.clone(),
        mailer.clone(),
        from_address.clone(),
    ));
    let sweeper = OverdueSweeper::new(
        payments.clone(),
        leases.clone(),
        properties.clone(),
        directory.clone(),
        mailer.clone(),
        from_address,
        4,
    );

    println!("RentEase workflow demo (evaluated {today})");

    println!("\nRent lifecycle");
    let property = match rent.create_property(
        &landlord,
        NewProperty {
            name: "Maple Court 2B".to_string(),
            address: "214 Maple Court, Unit 2B".to_string(),
        },
    ) {
        Ok(property) => property,
        Err(err) => {
            println!("  Property creation failed: {err}");
            return Ok(());
        }
    };
    println!("- Created property {} ({})", property.id.0, property.name);

    let lease_start = today
        .checked_sub_months(Months::new(2))
        .unwrap_or(today);
    let lease_end = today
        .checked_add_months(Months::new(10))
        .unwrap_or(today);
    let lease = match rent.assign_tenant(
        &landlord,
        NewLease {
            tenant_id: tenant.user_id.clone(),
            property_id: property.id.clone(),
            monthly_rent: 1450,
            lease_start_date: lease_start,
            lease_end_date: lease_end,
        },
    ) {
        Ok(lease) => lease,
        Err(err) => {
            println!("  Tenant assignment failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Assigned tenant {} on lease {} ({} -> {})",
        lease.tenant_id.0, lease.id.0, lease.lease_start_date, lease.lease_end_date
    );

    let schedule_start = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(today);
    let schedule = match rent.generate_schedule(
        &landlord,
        ScheduleRequest {
            lease_id: lease.id.clone(),
            start_date: schedule_start,
            months: 3,
        },
    ) {
        Ok(schedule) => schedule,
        Err(err) => {
            println!("  Schedule generation failed: {err}");
            return Ok(());
        }
    };
    println!("- Generated {} monthly obligations:", schedule.len());
    for payment in &schedule {
        println!(
            "  - {} due {} (${}) status {}",
            payment.id.0,
            payment.due_date,
            payment.amount,
            payment.status.label()
        );
    }

    let current = &schedule[1];
    match rent.record_payment(
        &tenant,
        RecordPayment {
            payment_id: current.id.clone(),
            payment_method: "bank_transfer".to_string(),
            transaction_id: Some("txn-10021".to_string()),
            notes: None,
        },
        today,
    ) {
        Ok(paid) => println!(
            "- Recorded payment {} as {} on {}",
            paid.id.0,
            paid.status.label(),
            paid.paid_date.map(|date| date.to_string()).unwrap_or_default()
        ),
        Err(err) => println!("  Payment recording failed: {err}"),
    }

    match notifications.send_payment_confirmation(&current.id) {
        Ok(receipt) => println!(
            "- Confirmation emails dispatched (tenant {}, landlord {})",
            receipt.tenant_email_id, receipt.landlord_email_id
        ),
        Err(err) => println!("  Payment confirmation failed: {err}"),
    }

    println!("\nOverdue sweep");
    match sweeper.run(today).await {
        Ok(report) => {
            println!(
                "- {} payment(s) flipped overdue, {} notice(s) emailed",
                report.overdue_count, report.emails_sent
            );
            for outcome in &report.outcomes {
                println!("  - {}: {:?}", outcome.payment_id.0, outcome.outcome);
            }
        }
        Err(err) => println!("  Sweep failed: {err}"),
    }

    let overdue = &schedule[0];
    match rent.record_payment(
        &tenant,
        RecordPayment {
            payment_id: overdue.id.clone(),
            payment_method: "cash".to_string(),
            transaction_id: None,
            notes: Some("late payment settled in person".to_string()),
        },
        today,
    ) {
        Ok(paid) => println!(
            "- Late payment {} settled: now {}",
            paid.id.0,
            paid.status.label()
        ),
        Err(err) => println!("  Late payment recording failed: {err}"),
    }

    match rent.dashboard_stats(&landlord, today) {
        Ok(stats) => match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("- Landlord dashboard:\n{json}"),
            Err(err) => println!("  Dashboard serialization failed: {err}"),
        },
        Err(err) => println!("  Dashboard stats failed: {err}"),
    }

    println!("\nMessaging");
    let sent = match messaging.send(
        &tenant,
        SendMessage {
            receiver_id: landlord.user_id.clone(),
            property_id: Some(property.id.clone()),
            content: "The kitchen faucet is leaking, could someone take a look?".to_string(),
            attachment_url: None,
        },
        Utc::now(),
    ) {
        Ok(message) => message,
        Err(err) => {
            println!("  Message send failed: {err}");
            return Ok(());
        }
    };
    println!("- Tenant sent message {}", sent.id.0);

    match messaging.unread_count(&landlord) {
        Ok(count) => println!("- Landlord unread count: {}", count.unread_count),
        Err(err) => println!("  Unread count failed: {err}"),
    }
    match messaging.conversations(&landlord) {
        Ok(conversations) => {
            for conversation in &conversations {
                println!(
                    "- Conversation with {} (unread {}): {}",
                    conversation.other_user_id.0,
                    conversation.unread_count,
                    conversation.last_message
                );
            }
        }
        Err(err) => println!("  Conversation listing failed: {err}"),
    }
    match messaging.mark_read(&landlord, &sent.id) {
        Ok(message) => println!("- Marked message {} read", message.id.0),
        Err(err) => println!("  Mark-read failed: {err}"),
    }

    println!("\nDocuments");
    let file_name = "signed-lease.pdf".to_string();
    let mime_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .to_string();
    let document = match documents.upload(
        &tenant,
        UploadRequest {
            title: Some("Signed lease agreement".to_string()),
            document_type: "lease".to_string(),
            property_id: Some(property.id.clone()),
            lease_id: Some(lease.id.clone()),
            file_name,
            mime_type,
            contents: b"%PDF-1.7 demo lease agreement".to_vec(),
        },
        Utc::now(),
    ) {
        Ok(document) => document,
        Err(err) => {
            println!("  Upload failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Uploaded {} ({} bytes, {}) as {}",
        document.file_name, document.file_size, document.mime_type, document.id.0
    );
    if let Some((size, mime)) = storage.object(&document.storage_key) {
        println!(
            "- Object {} held in storage ({size} bytes, {mime})",
            document.storage_key
        );
    }

    match documents.download(&landlord, &document.id) {
        Ok(signed) => println!("- Signed download link: {}", signed.download_url),
        Err(err) => println!("  Download failed: {err}"),
    }
    match documents.delete(&tenant, &document.id) {
        Ok(()) => println!("- Deleted document {}", document.id.0),
        Err(err) => println!("  Delete failed: {err}"),
    }

    let outbox = mailer.sent();
    println!("\nEmails dispatched: {}", outbox.len());
    for email in &outbox {
        println!("- to {} | {}", email.to.join(", "), email.subject);
    }

    Ok(())
}

pub(crate) async fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let from_address = "RentEase <noreply@rentease.app>".to_string();

    let properties = Arc::new(InMemoryPropertyRepository::default());
    let leases = Arc::new(InMemoryLeaseRepository::default());
    let payments = Arc::new(InMemoryPaymentRepository::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let mailer = Arc::new(RecordingMailer::default());

    let landlord = AuthContext {
        user_id: UserId("landlord-demo".to_string()),
        role: UserRole::Landlord,
    };
    let tenant = AuthContext {
        user_id: UserId("tenant-demo".to_string()),
        role: UserRole::Tenant,
    };
    directory.upsert(UserProfile {
        user_id: tenant.user_id.clone(),
        first_name: "Marcus".to_string(),
        last_name: "Reed".to_string(),
        email: Some("marcus.reed@example.com".to_string()),
    });

    let rent = RentService::new(properties.clone(), leases.clone(), payments.clone());
    let property = match rent.create_property(
        &landlord,
        NewProperty {
            name: "Maple Court 2B".to_string(),
            address: "214 Maple Court, Unit 2B".to_string(),
        },
    ) {
        Ok(property) => property,
        Err(err) => {
            println!("Property creation failed: {err}");
            return Ok(());
        }
    };
    let lease_start = today.checked_sub_months(Months::new(3)).unwrap_or(today);
    let lease_end = today.checked_add_months(Months::new(9)).unwrap_or(today);
    let lease = match rent.assign_tenant(
        &landlord,
        NewLease {
            tenant_id: tenant.user_id.clone(),
            property_id: property.id.clone(),
            monthly_rent: 1450,
            lease_start_date: lease_start,
            lease_end_date: lease_end,
        },
    ) {
        Ok(lease) => lease,
        Err(err) => {
            println!("Tenant assignment failed: {err}");
            return Ok(());
        }
    };
    let schedule_start = today.checked_sub_months(Months::new(2)).unwrap_or(today);
    if let Err(err) = rent.generate_schedule(
        &landlord,
        ScheduleRequest {
            lease_id: lease.id.clone(),
            start_date: schedule_start,
            months: 3,
        },
    ) {
        println!("Schedule generation failed: {err}");
        return Ok(());
    }

    let sweeper = OverdueSweeper::new(
        payments,
        leases,
        properties,
        directory,
        mailer.clone(),
        from_address,
        args.max_concurrent_sends,
    );
    match sweeper.run(today).await {
        Ok(report) => {
            println!(
                "Sweep of {today}: {} payment(s) flipped overdue, {} notice(s) emailed",
                report.overdue_count, report.emails_sent
            );
            for outcome in &report.outcomes {
                println!("- {}: {:?}", outcome.payment_id.0, outcome.outcome);
            }
            for email in &mailer.sent() {
                println!("- to {} | {}", email.to.join(", "), email.subject);
            }
        }
        Err(err) => println!("Sweep failed: {err}"),
    }

    Ok(())
}
