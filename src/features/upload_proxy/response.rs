//! Response builders for the upload proxy. Every proxy response, including
//! rejections and the pre-flight, goes through here so browsers on other
//! origins can always read the result.

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
];

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, CORS_HEADERS, Json(body)).into_response()
}

/// Sends an already-serialized JSON document byte for byte
pub fn raw_json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        CORS_HEADERS,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

pub fn preflight_response() -> Response {
    (StatusCode::OK, CORS_HEADERS).into_response()
}
