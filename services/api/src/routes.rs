use crate::infra::AppState;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use rentease::auth::Authenticator;
use rentease::workflows::documents::repository::DocumentRepository;
use rentease::workflows::documents::{documents_router, DocumentService, StorageGateway};
use rentease::workflows::messaging::repository::MessageRepository;
use rentease::workflows::messaging::{messaging_router, MessagingService};
use rentease::workflows::notify::directory::UserDirectory;
use rentease::workflows::notify::{
    notifications_router, Mailer, NotificationService, OverdueSweeper,
};
use rentease::workflows::rent::repository::{
    LeaseRepository, PaymentRepository, PropertyRepository,
};
use rentease::workflows::rent::{rent_router, RentService};
use serde_json::json;
use std::sync::Arc;

/// Compose the four action endpoints with the operational endpoints and the
/// permissive CORS layer the browser clients expect.
#[allow(clippy::too_many_arguments)]
pub(crate) fn with_api_routes<P, L, Pay, M, D, S, Dir, Mail, Auth>(
    rent: Arc<RentService<P, L, Pay>>,
    messaging: Arc<MessagingService<M, L, P>>,
    documents: Arc<DocumentService<D, S>>,
    notifications: Arc<NotificationService<L, P, Pay, Dir, Mail>>,
    sweeper: Arc<OverdueSweeper<Pay, L, P, Dir, Mail>>,
    authenticator: Arc<Auth>,
) -> axum::Router
where
    P: PropertyRepository + 'static,
    L: LeaseRepository + 'static,
    Pay: PaymentRepository + 'static,
    M: MessageRepository + 'static,
    D: DocumentRepository + 'static,
    S: StorageGateway + 'static,
    Dir: UserDirectory + 'static,
    Mail: Mailer + 'static,
    Auth: Authenticator + 'static,
{
    rent_router(rent, authenticator.clone())
        .merge(messaging_router(messaging, authenticator.clone()))
        .merge(documents_router(documents, authenticator.clone()))
        .merge(notifications_router(notifications, sweeper, authenticator))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .layer(axum::middleware::from_fn(cors))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Permissive CORS: answer preflights directly and stamp every response so
/// browser clients on any origin can call the API.
pub(crate) async fn cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return (
            StatusCode::NO_CONTENT,
            [
                (
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ),
                (
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOWED_HEADERS),
                ),
                (
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ),
            ],
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        InMemoryDirectory, InMemoryDocumentRepository, InMemoryLeaseRepository,
        InMemoryMessageRepository, InMemoryPaymentRepository, InMemoryPropertyRepository,
        InMemoryStorage, RecordingMailer, StaticTokenAuthenticator,
    };
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use rentease::auth::{AuthContext, UserId, UserRole};
    use tower::util::ServiceExt;

    fn test_router() -> axum::Router {
        let properties = Arc::new(InMemoryPropertyRepository::default());
        let leases = Arc::new(InMemoryLeaseRepository::default());
        let payments = Arc::new(InMemoryPaymentRepository::default());
        let messages = Arc::new(InMemoryMessageRepository::default());
        let document_records = Arc::new(InMemoryDocumentRepository::default());
        let storage = Arc::new(InMemoryStorage::default());
        let directory = Arc::new(InMemoryDirectory::default());
        let mailer = Arc::new(RecordingMailer::default());
        let authenticator = Arc::new(StaticTokenAuthenticator::default());
        authenticator.register(
            "landlord-token",
            AuthContext {
                user_id: UserId("landlord-1".to_string()),
                role: UserRole::Landlord,
            },
        );

        let from_address = "RentEase <noreply@rentease.app>".to_string();
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
        let documents = Arc::new(DocumentService::new(document_records, storage));
        let notifications = Arc::new(NotificationService::new(
            leases.clone(),
            properties.clone(),
            payments.clone(),
            directory.clone(),
            mailer.clone(),
            from_address.clone(),
        ));
        let sweeper = Arc::new(OverdueSweeper::new(
            payments,
            leases,
            properties,
            directory,
            mailer,
            from_address,
            4,
        ));

        with_api_routes(
            rent,
            messaging,
            documents,
            notifications,
            sweeper,
            authenticator,
        )
    }

    #[tokio::test]
    async fn preflight_is_answered_with_permissive_headers() {
        let router = test_router();
        let request = HttpRequest::builder()
            .method("OPTIONS")
            .uri("/api/v1/property-management?action=properties")
            .body(Body::empty())
            .expect("request builds");

        let response = router.oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let router = test_router();
        let request = HttpRequest::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");

        let response = router.oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn missing_bearer_token_is_unauthorized() {
        let router = test_router();
        let request = HttpRequest::builder()
            .uri("/api/v1/messaging?action=unread-count")
            .body(Body::empty())
            .expect("request builds");

        let response = router.oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let router = test_router();
        let request = HttpRequest::builder()
            .uri("/api/v1/property-management?action=bogus")
            .header(header::AUTHORIZATION, "Bearer landlord-token")
            .body(Body::empty())
            .expect("request builds");

        let response = router.oneshot(request).await.expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
