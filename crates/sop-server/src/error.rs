use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sop_core::SopError;

// ---------------------------------------------------------------------------
// Sentinels carried through the anyhow chain
// ---------------------------------------------------------------------------

/// Explicit HTTP 401 without touching the `SopError` enum.
#[derive(Debug)]
struct UnauthorizedError(String);

impl std::fmt::Display for UnauthorizedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnauthorizedError {}

/// Explicit HTTP 403.
#[derive(Debug)]
struct ForbiddenError(String);

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ForbiddenError {}

/// Explicit HTTP 404 for cases with no matching `SopError` variant.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

/// Explicit HTTP 502 for upstream LLM failures.
#[derive(Debug)]
struct UpstreamError(String);

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UpstreamError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Every response body is `{"error": {"code": …, "message": …}}` with the
/// status derived from the underlying error.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(UnauthorizedError(msg.into()).into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(SopError::InvalidSlug(msg.into()).into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self(UpstreamError(msg.into()).into())
    }
}

fn classify(err: &anyhow::Error) -> (StatusCode, &'static str) {
    if err.downcast_ref::<UnauthorizedError>().is_some() {
        return (StatusCode::UNAUTHORIZED, "unauthorized");
    }
    if err.downcast_ref::<ForbiddenError>().is_some() {
        return (StatusCode::FORBIDDEN, "forbidden");
    }
    if err.downcast_ref::<NotFoundError>().is_some() {
        return (StatusCode::NOT_FOUND, "not_found");
    }
    if err.downcast_ref::<UpstreamError>().is_some() {
        return (StatusCode::BAD_GATEWAY, "upstream_failed");
    }

    match err.downcast_ref::<SopError>() {
        Some(e) => match e {
            SopError::NotInitialized => (StatusCode::BAD_REQUEST, "not_initialized"),
            SopError::ObjectNotFound(_)
            | SopError::IssueNotFound(_)
            | SopError::MeetingNotFound(_)
            | SopError::RecurringNotFound(_)
            | SopError::TokenNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            SopError::ObjectExists(_) | SopError::RecurringExists(_) => {
                (StatusCode::CONFLICT, "conflict")
            }
            SopError::InvalidSlug(_)
            | SopError::InvalidStage(_)
            | SopError::InvalidStatus(_)
            | SopError::InvalidSeverity(_)
            | SopError::InvalidScope(_)
            | SopError::InvalidRecurrence(_)
            | SopError::InvalidDate(_) => (StatusCode::BAD_REQUEST, "validation"),
            SopError::InvalidTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_transition")
            }
            SopError::CsvImport(_) => (StatusCode::BAD_REQUEST, "csv_import"),
            SopError::Report(_) | SopError::Io(_) | SopError::Yaml(_) | SopError::Json(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        },
        None => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = classify(&self.0);
        let body = serde_json::json!({
            "error": { "code": code, "message": self.0.to_string() }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
