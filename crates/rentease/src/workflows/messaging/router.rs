use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Authenticator, UserId};
use crate::workflows::rent::repository::{LeaseRepository, PropertyRepository};
use crate::workflows::rent::router::{authenticate, parse_payload, unknown_action};
use crate::workflows::rent::domain::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::MessageId;
use super::repository::MessageRepository;
use super::service::{MessagingService, MessagingServiceError, SendMessage};

pub struct MessagingRouterState<M, L, P, Auth> {
    pub service: Arc<MessagingService<M, L, P>>,
    pub authenticator: Arc<Auth>,
}

impl<M, L, P, Auth> Clone for MessagingRouterState<M, L, P, Auth> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagingQuery {
    action: Option<String>,
    other_user_id: Option<String>,
    property_id: Option<String>,
    message_id: Option<String>,
}

/// Messaging endpoint dispatching on the `action` query parameter.
pub fn messaging_router<M, L, P, Auth>(
    service: Arc<MessagingService<M, L, P>>,
    authenticator: Arc<Auth>,
) -> Router
where
    M: MessageRepository + 'static,
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    Auth: Authenticator + 'static,
{
    let state = MessagingRouterState {
        service,
        authenticator,
    };
    Router::new()
        .route(
            "/api/v1/messaging",
            get(dispatch::<M, L, P, Auth>)
                .post(dispatch::<M, L, P, Auth>)
                .put(dispatch::<M, L, P, Auth>),
        )
        .with_state(state)
}

async fn dispatch<M, L, P, Auth>(
    State(state): State<MessagingRouterState<M, L, P, Auth>>,
    method: Method,
    Query(query): Query<MessagingQuery>,
    headers: HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Response
where
    M: MessageRepository + 'static,
    L: LeaseRepository + 'static,
    P: PropertyRepository + 'static,
    Auth: Authenticator + 'static,
{
    let ctx = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let body = body.map(|Json(value)| value);

    match (query.action.as_deref(), &method) {
        (Some("send"), &Method::POST) => match parse_payload::<SendMessage>(body) {
            Ok(submission) => respond(state.service.send(&ctx, submission, Utc::now())),
            Err(response) => response,
        },
        (Some("conversations"), &Method::GET) => respond(state.service.conversations(&ctx)),
        (Some("messages"), &Method::GET) => {
            let Some(other) = query.other_user_id else {
                return missing_parameter("other_user_id");
            };
            let property = query.property_id.map(PropertyId);
            respond(
                state
                    .service
                    .messages(&ctx, &UserId(other), property.as_ref()),
            )
        }
        (Some("mark-read"), &Method::PUT) => {
            let Some(message_id) = query.message_id else {
                return missing_parameter("message_id");
            };
            respond(state.service.mark_read(&ctx, &MessageId(message_id)))
        }
        (Some("unread-count"), &Method::GET) => respond(state.service.unread_count(&ctx)),
        _ => unknown_action(query.action.as_deref()),
    }
}

fn missing_parameter(name: &str) -> Response {
    let payload = json!({ "error": format!("{name} parameter required") });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, MessagingServiceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => messaging_error(err),
    }
}

fn messaging_error(err: MessagingServiceError) -> Response {
    let status = match &err {
        MessagingServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        MessagingServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        MessagingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MessagingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MessagingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
