use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryDirectory, InMemoryDocumentRepository, InMemoryLeaseRepository,
    InMemoryMessageRepository, InMemoryPaymentRepository, InMemoryPropertyRepository,
    InMemoryStorage, RecordingMailer, StaticTokenAuthenticator,
};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rentease::auth::{AuthContext, UserId, UserRole};
use rentease::config::{AppConfig, AppEnvironment};
use rentease::error::AppError;
use rentease::telemetry;
use rentease::workflows::documents::DocumentService;
use rentease::workflows::messaging::MessagingService;
use rentease::workflows::notify::{NotificationService, OverdueSweeper, UserProfile};
use rentease::workflows::rent::RentService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let properties = Arc::new(InMemoryPropertyRepository::default());
    let leases = Arc::new(InMemoryLeaseRepository::default());
    let payments = Arc::new(InMemoryPaymentRepository::default());
    let messages = Arc::new(InMemoryMessageRepository::default());
    let document_records = Arc::new(InMemoryDocumentRepository::default());
    let storage = Arc::new(InMemoryStorage::default());
    let directory = Arc::new(InMemoryDirectory::default());
    let mailer = Arc::new(RecordingMailer::default());
    let authenticator = Arc::new(StaticTokenAuthenticator::default());

    if config.environment != AppEnvironment::Production {
        seed_demo_identities(&directory, &authenticator);
        info!("seeded demo identities; bearer tokens landlord-demo-token and tenant-demo-token");
    }

    let rent_service = Arc::new(RentService::new(
        properties.clone(),
        leases.clone(),
        payments.clone(),
    ));
    let messaging_service = Arc::new(MessagingService::new(
        messages,
        leases.clone(),
        properties.clone(),
    ));
    let document_service = Arc::new(DocumentService::new(document_records, storage));
    let notification_service = Arc::new(NotificationService::new(
        leases.clone(),
        properties.clone(),
        payments.clone(),
        directory.clone(),
        mailer.clone(),
        config.mail.from_address.clone(),
    ));
    let sweeper = Arc::new(OverdueSweeper::new(
        payments,
        leases,
        properties,
        directory,
        mailer,
        config.mail.from_address.clone(),
        config.sweep.max_concurrent_sends,
    ));

    let app = with_api_routes(
        rent_service,
        messaging_service,
        document_service,
        notification_service,
        sweeper,
        authenticator,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rental management api ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn seed_demo_identities(directory: &InMemoryDirectory, authenticator: &StaticTokenAuthenticator) {
    let landlord = UserId("landlord-demo".to_string());
    let tenant = UserId("tenant-demo".to_string());

    directory.upsert(UserProfile {
        user_id: landlord.clone(),
        first_name: "Dana".to_string(),
        last_name: "Whitfield".to_string(),
        email: Some("dana.whitfield@example.com".to_string()),
    });
    directory.upsert(UserProfile {
        user_id: tenant.clone(),
        first_name: "Marcus".to_string(),
        last_name: "Reed".to_string(),
        email: Some("marcus.reed@example.com".to_string()),
    });

    authenticator.register(
        "landlord-demo-token",
        AuthContext {
            user_id: landlord,
            role: UserRole::Landlord,
        },
    );
    authenticator.register(
        "tenant-demo-token",
        AuthContext {
            user_id: tenant,
            role: UserRole::Tenant,
        },
    );
}
