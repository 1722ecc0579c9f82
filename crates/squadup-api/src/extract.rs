//! Request extractors whose rejections use the JSON error envelope

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ErrorResponse;

/// `Json<T>` that rejects with `INVALID_JSON`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ExtractError))]
pub struct ApiJson<T>(pub T);

/// `Path<T>` that rejects with `INVALID_PATH`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ExtractError))]
pub struct ApiPath<T>(pub T);

/// `Query<T>` that rejects with `INVALID_QUERY`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ExtractError))]
pub struct ApiQuery<T>(pub T);

/// A malformed request, reported with axum's status and message
#[derive(Debug)]
pub struct ExtractError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<JsonRejection> for ExtractError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            code: "INVALID_JSON",
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ExtractError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            code: "INVALID_PATH",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ExtractError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            code: "INVALID_QUERY",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message, self.code))).into_response()
    }
}
