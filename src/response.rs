//! Uniform JSON envelope: `{ ...payload, "code": <status> }`, errors add `"msg": "<VERB> - <message>"`.

use crate::error::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub payload: Map<String, Value>,
}

impl ApiResponse {
    /// Envelope body with the `code` field mirroring the status.
    pub fn body(&self) -> Value {
        let mut body = self.payload.clone();
        body.insert("code".into(), Value::from(self.status.as_u16()));
        Value::Object(body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

pub fn api_response(payload: Map<String, Value>, status: StatusCode) -> ApiResponse {
    ApiResponse { status, payload }
}

/// Status-only success.
pub fn api_ok() -> ApiResponse {
    api_response(Map::new(), StatusCode::OK)
}

/// GET result: 200 with models, or 404 when nothing matched.
pub fn api_models(models: Vec<Value>) -> ApiResponse {
    let status = if models.is_empty() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let mut payload = Map::new();
    payload.insert("models".into(), Value::Array(models));
    api_response(payload, status)
}

/// Error envelope; `label` is the verb (or "HTTP" at the dispatch layer).
pub fn api_error_response(label: &str, err: &ApiError) -> ApiResponse {
    let mut payload = Map::new();
    payload.insert("msg".into(), Value::String(format!("{} - {}", label, err)));
    api_response(payload, err.status_code())
}
