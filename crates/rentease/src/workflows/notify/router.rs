use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Authenticator;
use crate::workflows::rent::domain::{LeaseId, PaymentId};
use crate::workflows::rent::repository::{
    LeaseRepository, PaymentRepository, PropertyRepository,
};
use crate::workflows::rent::router::{authenticate, parse_payload, unknown_action};
use crate::workflows::store::RepositoryError;

use super::directory::{DirectoryError, UserDirectory};
use super::mailer::Mailer;
use super::service::{NotificationService, NotifyError};
use super::sweep::OverdueSweeper;

pub struct NotificationsRouterState<L, P, Pay, D, M, Auth> {
    pub service: Arc<NotificationService<L, P, Pay, D, M>>,
    pub sweeper: Arc<OverdueSweeper<Pay, L, P, D, M>>,
    pub authenticator: Arc<Auth>,
}

impl<L, P, Pay, D, M, Auth> Clone for NotificationsRouterState<L, P, Pay, D, M, Auth> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            sweeper: self.sweeper.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NotificationsQuery {
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReminderRequest {
    tenant_property_id: LeaseId,
    days_until_due: u32,
}

#[derive(Debug, Deserialize)]
struct ConfirmationRequest {
    payment_id: PaymentId,
}

#[derive(Debug, Deserialize)]
struct ExpiryNoticeRequest {
    tenant_property_id: LeaseId,
    days_until_expiry: u32,
}

/// Notifications endpoint dispatching on the `action` query parameter; all
/// actions are POST.
pub fn notifications_router<L, P, Pay, D, M, Auth>(
    service: Arc<NotificationService<L, P, Pay, D, M>>,
    sweeper: Arc<OverdueSweeper<Pay, L, P, D, M>>,
    authenticator: Arc<Auth>,
) -> Router
where
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    Pay: PaymentRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
    Auth: Authenticator + 'static,
{
    let state = NotificationsRouterState {
        service,
        sweeper,
        authenticator,
    };
    Router::new()
        .route(
            "/api/v1/notifications",
            post(dispatch::<L, P, Pay, D, M, Auth>),
        )
        .with_state(state)
}

async fn dispatch<L, P, Pay, D, M, Auth>(
    State(state): State<NotificationsRouterState<L, P, Pay, D, M, Auth>>,
    method: Method,
    Query(query): Query<NotificationsQuery>,
    headers: HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Response
where
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    Pay: PaymentRepository + 'static,
    D: UserDirectory + 'static,
    M: Mailer + 'static,
    Auth: Authenticator + 'static,
{
    if let Err(response) = authenticate(state.authenticator.as_ref(), &headers) {
        return response;
    }
    let body = body.map(|Json(value)| value);

    match (query.action.as_deref(), &method) {
        (Some("send-rent-reminder"), &Method::POST) => {
            match parse_payload::<ReminderRequest>(body) {
                Ok(request) => respond(
                    state
                        .service
                        .send_rent_reminder(&request.tenant_property_id, request.days_until_due),
                ),
                Err(response) => response,
            }
        }
        (Some("send-payment-confirmation"), &Method::POST) => {
            match parse_payload::<ConfirmationRequest>(body) {
                Ok(request) => respond(state.service.send_payment_confirmation(&request.payment_id)),
                Err(response) => response,
            }
        }
        (Some("send-lease-expiry-notice"), &Method::POST) => {
            match parse_payload::<ExpiryNoticeRequest>(body) {
                Ok(request) => respond(state.service.send_lease_expiry_notice(
                    &request.tenant_property_id,
                    request.days_until_expiry,
                )),
                Err(response) => response,
            }
        }
        (Some("check-overdue-payments"), &Method::POST) => {
            let today = Local::now().date_naive();
            match state.sweeper.run(today).await {
                Ok(report) => (StatusCode::OK, Json(report)).into_response(),
                Err(err) => {
                    let payload = json!({ "error": err.to_string() });
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
                }
            }
        }
        _ => unknown_action(query.action.as_deref()),
    }
}

fn respond<T: serde::Serialize>(result: Result<T, NotifyError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => notify_error(err),
    }
}

fn notify_error(err: NotifyError) -> Response {
    let status = match &err {
        NotifyError::Validation(_) => StatusCode::BAD_REQUEST,
        NotifyError::MissingEmail { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        NotifyError::Repository(RepositoryError::NotFound)
        | NotifyError::Directory(DirectoryError::NotFound) => StatusCode::NOT_FOUND,
        NotifyError::Repository(_) | NotifyError::Directory(_) | NotifyError::Mail(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
