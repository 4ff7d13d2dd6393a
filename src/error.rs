//! Typed errors and HTTP status mapping.

use axum::http::StatusCode;
use thiserror::Error;

/// Startup errors: settings, schema file, schema validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },
    #[error("invalid identifier for {kind}: '{name}'")]
    InvalidIdentifier { kind: &'static str, name: String },
    #[error("settings: {0}")]
    Settings(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Failures raised by a storage collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("cannot filter '{entity}' on '{field}'")]
    UnfilterableField { entity: String, field: String },
    #[error("record has no '{0}' value")]
    MissingId(String),
    #[error("{0}")]
    Backend(String),
}

/// Request errors. Every variant is classified to an HTTP status; none escape the
/// dispatch boundary unconverted.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No {what} supplied in request! (param: {param})")]
    MissingParameter { param: &'static str, what: &'static str },
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),
    #[error("Malformed sort: {0}")]
    MalformedSort(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Field '{field}' not found for model: '{entity}'")]
    UnknownField { field: String, entity: String },
    #[error("Field '{field}' is read-only for model: '{entity}'")]
    ReadOnlyField { field: String, entity: String },
    #[error("Invalid value for field '{field}' on model '{entity}': {reason}")]
    InvalidValue {
        field: String,
        entity: String,
        reason: String,
    },
    #[error("Model not found: '{0}'")]
    ModelNotFound(String),
    #[error("Method {verb} not allowed for model: '{entity}'")]
    MethodNotAllowed { entity: String, verb: String },
    #[error("Invalid method: {0}")]
    UnsupportedMethod(String),
    #[error("No '{0}' matches the supplied filter")]
    NoMatch(String),
    #[error("Filter matches {count} '{entity}' models, expected exactly one")]
    AmbiguousMatch { entity: String, count: usize },
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    pub fn missing(param: &'static str) -> Self {
        let what = match param {
            "model" => "model",
            "filter" => "model filter",
            "fields" => "fields",
            _ => param,
        };
        ApiError::MissingParameter { param, what }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter { .. }
            | ApiError::MalformedFilter(_)
            | ApiError::MalformedSort(_)
            | ApiError::MalformedPayload(_)
            | ApiError::UnknownField { .. }
            | ApiError::ReadOnlyField { .. }
            | ApiError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            ApiError::ModelNotFound(_) | ApiError::NoMatch(_) | ApiError::AmbiguousMatch { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::MethodNotAllowed { .. } | ApiError::UnsupportedMethod(_) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
