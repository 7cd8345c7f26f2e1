use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{bearer_token, AuthContext, Authenticator};
use crate::workflows::store::RepositoryError;

use super::service::{
    NewLease, NewProperty, RecordPayment, RentService, RentServiceError, ScheduleRequest,
};
use super::repository::{LeaseRepository, PaymentRepository, PropertyRepository};

/// Handler state: the service plus the identity-provider seam, built per
/// process and passed explicitly rather than read from ambient globals.
pub struct RentRouterState<P, L, Pay, Auth> {
    pub service: Arc<RentService<P, L, Pay>>,
    pub authenticator: Arc<Auth>,
}

impl<P, L, Pay, Auth> Clone for RentRouterState<P, L, Pay, Auth> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionQuery {
    pub(crate) action: Option<String>,
}

/// Property-management endpoint dispatching on the `action` query
/// parameter, mirroring the deployed interface table.
pub fn rent_router<P, L, Pay, Auth>(
    service: Arc<RentService<P, L, Pay>>,
    authenticator: Arc<Auth>,
) -> Router
where
    P: PropertyRepository + 'static,
    L: LeaseRepository + 'static,
    Pay: PaymentRepository + 'static,
    Auth: Authenticator + 'static,
{
    let state = RentRouterState {
        service,
        authenticator,
    };
    Router::new()
        .route(
            "/api/v1/property-management",
            get(dispatch::<P, L, Pay, Auth>).post(dispatch::<P, L, Pay, Auth>),
        )
        .with_state(state)
}

async fn dispatch<P, L, Pay, Auth>(
    State(state): State<RentRouterState<P, L, Pay, Auth>>,
    method: Method,
    Query(query): Query<ActionQuery>,
    headers: HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Response
where
    P: PropertyRepository + 'static,
    L: LeaseRepository + 'static,
    Pay: PaymentRepository + 'static,
    Auth: Authenticator + 'static,
{
    let ctx = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let body = body.map(|Json(value)| value);
    let today = Local::now().date_naive();

    match (query.action.as_deref(), &method) {
        (Some("dashboard-stats"), &Method::GET) => {
            respond(state.service.dashboard_stats(&ctx, today))
        }
        (Some("properties"), &Method::GET) => respond(state.service.properties(&ctx)),
        (Some("properties"), &Method::POST) => match parse_payload::<NewProperty>(body) {
            Ok(submission) => respond(state.service.create_property(&ctx, submission)),
            Err(response) => response,
        },
        (Some("assign-tenant"), &Method::POST) => match parse_payload::<NewLease>(body) {
            Ok(assignment) => respond(state.service.assign_tenant(&ctx, assignment)),
            Err(response) => response,
        },
        (Some("rent-payments"), &Method::GET) => respond(state.service.rent_payments(&ctx)),
        (Some("rent-payments"), &Method::POST) => match parse_payload::<RecordPayment>(body) {
            Ok(record) => respond(state.service.record_payment(&ctx, record, today)),
            Err(response) => response,
        },
        (Some("generate-rent-schedule"), &Method::POST) => {
            match parse_payload::<ScheduleRequest>(body) {
                Ok(request) => respond(state.service.generate_schedule(&ctx, request)),
                Err(response) => response,
            }
        }
        _ => unknown_action(query.action.as_deref()),
    }
}

pub(crate) fn authenticate<A: Authenticator + ?Sized>(
    authenticator: &A,
    headers: &HeaderMap,
) -> Result<AuthContext, Response> {
    let token = bearer_token(headers).map_err(|err| {
        let payload = json!({ "error": err.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    })?;
    authenticator.authenticate(token).map_err(|err| {
        let payload = json!({ "error": err.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    })
}

pub(crate) fn parse_payload<T: serde::de::DeserializeOwned>(
    body: Option<serde_json::Value>,
) -> Result<T, Response> {
    let value = body.ok_or_else(|| {
        let payload = json!({ "error": "request body required" });
        (StatusCode::BAD_REQUEST, Json(payload)).into_response()
    })?;
    serde_json::from_value(value).map_err(|err| {
        let payload = json!({ "error": format!("invalid payload: {err}") });
        (StatusCode::BAD_REQUEST, Json(payload)).into_response()
    })
}

pub(crate) fn unknown_action(action: Option<&str>) -> Response {
    let payload = json!({
        "error": match action {
            Some(action) => format!("unsupported action '{action}' for this method"),
            None => "missing action parameter".to_string(),
        },
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, RentServiceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => rent_error(err),
    }
}

fn rent_error(err: RentServiceError) -> Response {
    let status = match &err {
        RentServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        RentServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        RentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
