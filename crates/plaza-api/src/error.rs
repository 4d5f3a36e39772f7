use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plaza_community::{CommunityError, ErrorKind};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Community(#[from] CommunityError),

    /// Failures outside the community core: hashing, token signing, task joins
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal<T: ToString>(msg: T) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Community(e) => e.kind(),
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

// Extractor failures render through `ApiError` like every other failure.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        CommunityError::invalid_input(format!("bad query string: {}", rejection.body_text())).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        CommunityError::invalid_input(format!("bad request body: {}", rejection.body_text())).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        CommunityError::invalid_input(format!("bad path: {}", rejection.body_text())).into()
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::BadInput => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        // Store and runtime details stay in the log.
        let message = if kind == ErrorKind::Internal {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": kind.as_str(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (CommunityError::Unauthorized, StatusCode::UNAUTHORIZED),
            (CommunityError::not_found("comment 1"), StatusCode::NOT_FOUND),
            (CommunityError::forbidden("nope"), StatusCode::FORBIDDEN),
            (CommunityError::conflict("already liked"), StatusCode::CONFLICT),
            (CommunityError::invalid_state("nesting depth exceeded"), StatusCode::BAD_REQUEST),
            (CommunityError::invalid_input("empty"), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn store_failures_are_500() {
        let err = ApiError::from(CommunityError::from(anyhow::anyhow!("database is locked")));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::internal("join").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
