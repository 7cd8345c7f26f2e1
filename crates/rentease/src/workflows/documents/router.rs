use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Authenticator;
use crate::workflows::rent::domain::{LeaseId, PropertyId};
use crate::workflows::rent::router::{authenticate, unknown_action};
use crate::workflows::store::RepositoryError;

use super::domain::DocumentId;
use super::repository::DocumentRepository;
use super::service::{DocumentService, DocumentServiceError, UploadRequest};
use super::storage::{StorageError, StorageGateway};

pub struct DocumentsRouterState<D, S, Auth> {
    pub service: Arc<DocumentService<D, S>>,
    pub authenticator: Arc<Auth>,
}

impl<D, S, Auth> Clone for DocumentsRouterState<D, S, Auth> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            authenticator: self.authenticator.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentsQuery {
    action: Option<String>,
    title: Option<String>,
    document_type: Option<String>,
    property_id: Option<String>,
    lease_id: Option<String>,
    file_name: Option<String>,
    document_id: Option<String>,
}

/// Document-management endpoint dispatching on the `action` query
/// parameter. Uploads carry the file as the raw request body with metadata
/// in the query string and the mime type in the Content-Type header.
pub fn documents_router<D, S, Auth>(
    service: Arc<DocumentService<D, S>>,
    authenticator: Arc<Auth>,
) -> Router
where
    D: DocumentRepository + 'static,
    S: StorageGateway + 'static,
    Auth: Authenticator + 'static,
{
    let state = DocumentsRouterState {
        service,
        authenticator,
    };
    Router::new()
        .route(
            "/api/v1/document-management",
            get(dispatch::<D, S, Auth>)
                .post(dispatch::<D, S, Auth>)
                .delete(dispatch::<D, S, Auth>),
        )
        .with_state(state)
}

async fn dispatch<D, S, Auth>(
    State(state): State<DocumentsRouterState<D, S, Auth>>,
    method: Method,
    Query(query): Query<DocumentsQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    D: DocumentRepository + 'static,
    S: StorageGateway + 'static,
    Auth: Authenticator + 'static,
{
    let ctx = match authenticate(state.authenticator.as_ref(), &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match (query.action.as_deref(), &method) {
        (Some("upload"), &Method::POST) => {
            let Some(file_name) = query.file_name else {
                return missing_parameter("file_name");
            };
            let Some(document_type) = query.document_type else {
                return missing_parameter("document_type");
            };
            let mime_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
                .to_string();
            let request = UploadRequest {
                title: query.title,
                document_type,
                property_id: query.property_id.map(PropertyId),
                lease_id: query.lease_id.map(LeaseId),
                file_name,
                mime_type,
                contents: body.to_vec(),
            };
            respond(state.service.upload(&ctx, request, Utc::now()))
        }
        (Some("list"), &Method::GET) => {
            let property = query.property_id.map(PropertyId);
            let lease = query.lease_id.map(LeaseId);
            respond(state.service.list(&ctx, property.as_ref(), lease.as_ref()))
        }
        (Some("download"), &Method::GET) => {
            let Some(document_id) = query.document_id else {
                return missing_parameter("document_id");
            };
            respond(state.service.download(&ctx, &DocumentId(document_id)))
        }
        (Some("delete"), &Method::DELETE) => {
            let Some(document_id) = query.document_id else {
                return missing_parameter("document_id");
            };
            match state.service.delete(&ctx, &DocumentId(document_id)) {
                Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
                Err(err) => documents_error(err),
            }
        }
        _ => unknown_action(query.action.as_deref()),
    }
}

fn missing_parameter(name: &str) -> Response {
    let payload = json!({ "error": format!("{name} parameter required") });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, DocumentServiceError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => documents_error(err),
    }
}

fn documents_error(err: DocumentServiceError) -> Response {
    let status = match &err {
        DocumentServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        DocumentServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        DocumentServiceError::Repository(RepositoryError::NotFound)
        | DocumentServiceError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
        DocumentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DocumentServiceError::Repository(RepositoryError::Unavailable(_))
        | DocumentServiceError::Storage(StorageError::Backend(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
