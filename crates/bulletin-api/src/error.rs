use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use bulletin_types::api::MessageError;
use bulletin_types::validation::ValidationProblem;

use crate::diagnostics::LOG_PREFIX;

/// Every way a public message handler can fail.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with no body.
    BadRequest,
    /// 404 with no body.
    NotFound,
    /// Input failed validation before reaching the handler.
    Invalid(ValidationProblem),
    /// Caught at the handler boundary and surfaced as `{message, stack}`.
    Reported {
        status: StatusCode,
        error: anyhow::Error,
    },
    /// Not handled by the route; ends up as a bare 500.
    Unhandled(anyhow::Error),
}

impl ApiError {
    /// 500 carrying the failure's message and stack.
    pub fn reported(error: impl Into<anyhow::Error>) -> Self {
        Self::Reported {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: error.into(),
        }
    }

    pub fn reported_with(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self::Reported {
            status,
            error: error.into(),
        }
    }

    pub fn unhandled(error: impl Into<anyhow::Error>) -> Self {
        Self::Unhandled(error.into())
    }
}

/// The `{message, stack}` payload for a failure. The stack is the full
/// `anyhow` debug rendering: cause chain plus backtrace when captured.
pub fn message_error(error: &anyhow::Error) -> MessageError {
    MessageError::new(error.to_string(), format!("{:?}", error))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Invalid(problem) => {
                let status =
                    StatusCode::from_u16(problem.status).unwrap_or(StatusCode::BAD_REQUEST);
                (status, Json(problem)).into_response()
            }
            Self::Reported { status, error } => {
                let body = message_error(&error);
                error!("{} {} Stack trace: {}", LOG_PREFIX, body.message, body.stack);
                (status, Json(body)).into_response()
            }
            Self::Unhandled(error) => {
                error!("Unhandled error: {:?}", error);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<ValidationProblem> for ApiError {
    fn from(problem: ValidationProblem) -> Self {
        Self::Invalid(problem)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let mut problem = ValidationProblem::with_status(rejection.status().as_u16());
        problem.add("$", rejection.body_text());
        Self::Invalid(problem)
    }
}
