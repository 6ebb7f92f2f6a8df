use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::domain::{AssessmentError, FormFields};
use super::renderer::{DisplayState, RenderOutcome};
use super::service::{AssessmentService, AssessmentServiceError};
use super::session::{SessionError, SessionId, SessionStore};

/// Router builder exposing session, submission, display, and report routes.
pub fn assessment_router<S>(service: Arc<AssessmentService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/assessments/sessions", post(open_handler::<S>))
        .route(
            "/api/v1/assessments/sessions/:session_id",
            delete(close_handler::<S>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/submissions",
            post(submit_handler::<S>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/display",
            get(display_handler::<S>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/report",
            get(report_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn open_handler<S>(State(service): State<Arc<AssessmentService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.open_session() {
        Ok(session_id) => {
            let payload = json!({
                "session_id": session_id,
                "strategy": service.strategy(),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn close_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(fields): axum::Json<FormFields>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = SessionId(session_id);
    match service.submit(&id, &fields).await {
        Ok(receipt) => {
            let status = match (&receipt.outcome, &receipt.display) {
                (RenderOutcome::Discarded { .. }, _) => StatusCode::CONFLICT,
                (RenderOutcome::Applied, DisplayState::Failed { .. }) => StatusCode::BAD_GATEWAY,
                (RenderOutcome::Applied, _) => StatusCode::OK,
            };
            (status, axum::Json(receipt)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn display_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.display(&SessionId(session_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.export(&SessionId(session_id)).await {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.body,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &AssessmentServiceError) -> StatusCode {
    match err {
        AssessmentServiceError::Assessment(AssessmentError::InvalidInput { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Assessment(AssessmentError::PredictionUnavailable(_)) => {
            StatusCode::BAD_GATEWAY
        }
        AssessmentServiceError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Session(SessionError::Conflict)
        | AssessmentServiceError::ExportDisabled => StatusCode::CONFLICT,
        AssessmentServiceError::Session(SessionError::CapacityExhausted(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AssessmentServiceError::Session(SessionError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: AssessmentServiceError) -> Response {
    let status = status_for(&err);
    let mut payload = json!({ "error": err.to_string() });
    if let AssessmentServiceError::Assessment(AssessmentError::InvalidInput { field, .. }) = &err {
        payload["field"] = json!(field);
    }
    (status, axum::Json(payload)).into_response()
}
