//! HTTP handlers for the server.

pub mod labels;
pub mod qr;
pub mod sheets;

use axum::http::StatusCode;

use crate::error::LabelError;

/// Map a library error to a response status and message.
pub(crate) fn error_response(e: LabelError) -> (StatusCode, String) {
    let status = match &e {
        LabelError::InvalidPath(_)
        | LabelError::InvalidTemplate(_)
        | LabelError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        LabelError::ImageLoad { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// Map a failed blocking task.
pub(crate) fn task_error(e: tokio::task::JoinError) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Task error: {}", e),
    )
}
