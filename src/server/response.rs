//! Response envelope: `{ok, data?, message?}`.

use axum::http::StatusCode;
use axum::response::{
    IntoResponse,
    Json,
    Response,
};
use serde::Serialize;

use crate::service::ServiceError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), message: None, status: StatusCode::OK }
    }

    /// Successful response without data.
    pub fn done() -> Self {
        Self { ok: true, data: None, message: None, status: StatusCode::OK }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self { ok: false, data: None, message: Some(message.into()), status }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T> From<ServiceError> for ApiResponse<T> {
    fn from(error: ServiceError) -> Self {
        let status = if error.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(%error, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::failure(status, error.to_string())
    }
}

impl<T> From<Result<T, ServiceError>> for ApiResponse<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => error.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
