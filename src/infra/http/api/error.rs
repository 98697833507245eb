use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use primer_api_types::{ApiErrorBody, ApiSubError};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::application::auth::AuthError;
use crate::application::error::ErrorReport;
use crate::application::items::ItemError;
use crate::application::repos::RepoError;
use crate::domain::error::{DomainError, FieldViolation};

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const PRECONDITION_FAILED: &str = "precondition_failed";
    pub const DUPLICATE: &str = "duplicate";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL: &str = "internal_error";
}

const SOURCE: &str = "infra::http::api";

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    sub_errors: Vec<ApiSubError>,
    /// Internal diagnostic, logged but never returned.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            sub_errors: Vec::new(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn validation(violations: &[FieldViolation]) -> Self {
        let mut error = Self::new(
            StatusCode::BAD_REQUEST,
            codes::VALIDATION_FAILED,
            "Validation failed",
        );
        error.sub_errors = violations
            .iter()
            .map(|violation| ApiSubError {
                field: violation.field.to_string(),
                rejected_value: violation.rejected_value.clone(),
                message: violation.reason.clone(),
            })
            .collect();
        error
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Full authentication is required to access this resource",
        )
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            codes::FORBIDDEN,
            "Access is denied",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    pub fn precondition_failed() -> Self {
        Self::new(
            StatusCode::PRECONDITION_FAILED,
            codes::PRECONDITION_FAILED,
            "Entity tag does not match the current representation",
        )
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Unexpected error occurred",
        )
        .with_detail(detail)
    }

    fn body(&self) -> ApiErrorBody {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        ApiErrorBody {
            status: self.status.as_u16(),
            error: self.code.to_string(),
            message: self.message.clone(),
            timestamp,
            sub_errors: self.sub_errors.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            SOURCE,
            self.status,
            format!(
                "{}: {}",
                self.code,
                self.detail.as_deref().unwrap_or(&self.message)
            ),
        )
        .attach(&mut response);
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        let detail = err.to_string();
        let error = match err {
            RepoError::Duplicate { .. } => {
                ApiError::new(StatusCode::CONFLICT, codes::DUPLICATE, "Duplicate record")
            }
            RepoError::NotFound => ApiError::not_found("Resource not found"),
            RepoError::VersionConflict { .. } => ApiError::new(
                StatusCode::CONFLICT,
                codes::CONFLICT,
                "Resource was modified concurrently",
            ),
            RepoError::InvalidInput { .. } => ApiError::bad_request("Invalid input"),
            RepoError::Timeout => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::DB_TIMEOUT,
                "Service temporarily unavailable",
            ),
            RepoError::Integrity { .. } | RepoError::Persistence(_) => {
                return ApiError::internal(detail);
            }
        };
        error.with_detail(detail)
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => ApiError::not_found(format!("Item {id} not found")),
            ItemError::Conflict { id } => ApiError::new(
                StatusCode::CONFLICT,
                codes::CONFLICT,
                format!("Item {id} was modified concurrently"),
            ),
            ItemError::Domain(DomainError::Validation { violations }) => {
                ApiError::validation(&violations)
            }
            ItemError::Domain(err @ DomainError::Invariant { .. }) => {
                ApiError::internal(err.to_string())
            }
            ItemError::Repo(err) => ApiError::from(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let detail = err.to_string();
        match err {
            AuthError::Forbidden => ApiError::forbidden().with_detail(detail),
            AuthError::Lookup(_) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UNAVAILABLE,
                "Service temporarily unavailable",
            )
            .with_detail(detail),
            AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser(_)
            | AuthError::AccountDisabled(_)
            | AuthError::AccountLocked(_) => ApiError::unauthorized().with_detail(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn item_errors_map_to_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(ItemError::NotFound(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ItemError::Conflict { id }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ItemError::Repo(RepoError::Persistence("boom".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_carries_sub_errors() {
        let error = ApiError::validation(&[FieldViolation::new(
            "name",
            Some(String::new()),
            "must not be empty",
        )]);
        let body = error.body();
        assert_eq!(body.status, 400);
        assert_eq!(body.sub_errors.len(), 1);
        assert_eq!(body.sub_errors[0].field, "name");
    }

    #[test]
    fn response_carries_error_report() {
        let response = ApiError::internal("pool closed").into_response();
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.messages, vec!["internal_error: pool closed"]);
    }
}
