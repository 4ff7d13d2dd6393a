//! Request normalization: query string, form body and JSON body merged into one flat parameter set.

use crate::error::ApiError;
use crate::query::RawValue;
use axum::body::Bytes;
use axum::http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body as captured by the extractor, before decoding.
#[derive(Clone, Debug, Default)]
pub enum RawBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded`, already decoded into pairs.
    Form(Vec<(String, String)>),
    /// Anything else; decoded as JSON.
    Text(Bytes),
}

/// Why the extractor could not capture part of a request.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    Malformed(String),
    /// Body exceeded the configured limit.
    TooLarge(String),
}

/// Transport-level view of one request.
#[derive(Clone, Debug)]
pub struct RawRequest {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: RawBody,
    /// First extraction failure (bad query string, unreadable or oversized body).
    pub rejection: Option<Rejection>,
}

/// Canonical parameters for one request. Later sources override earlier ones.
#[derive(Clone, Debug, Default)]
pub struct RequestParameters {
    values: HashMap<String, RawValue>,
}

impl RequestParameters {
    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        self.values.insert(name.into(), value);
    }

    /// A present, non-blank parameter.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name).filter(|v| !v.is_blank())
    }

    /// First non-blank parameter among `names`, with the name that matched.
    pub fn first_of<'a>(&self, names: &[&'a str]) -> Option<(&'a str, &RawValue)> {
        names.iter().find_map(|n| self.get(n).map(|v| (*n, v)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, RawValue)> for RequestParameters {
    fn from_iter<T: IntoIterator<Item = (String, RawValue)>>(iter: T) -> Self {
        RequestParameters {
            values: iter.into_iter().collect(),
        }
    }
}

/// Merge every parameter source of `raw` into one mapping.
/// With `lenient_quotes`, a body that fails strict JSON parsing is retried with single
/// quotes replaced by double quotes; this breaks on values that contain an apostrophe.
pub fn normalize(raw: &RawRequest, lenient_quotes: bool) -> Result<RequestParameters, ApiError> {
    match &raw.rejection {
        Some(Rejection::Malformed(reason)) => return Err(ApiError::MalformedPayload(reason.clone())),
        Some(Rejection::TooLarge(reason)) => return Err(ApiError::PayloadTooLarge(reason.clone())),
        None => {}
    }
    let mut params = RequestParameters::default();
    for (k, v) in &raw.query {
        params.insert(k.clone(), RawValue::Encoded(v.clone()));
    }
    match &raw.body {
        RawBody::Empty => {}
        RawBody::Form(pairs) => {
            for (k, v) in pairs {
                params.insert(k.clone(), RawValue::Encoded(v.clone()));
            }
        }
        RawBody::Text(bytes) => {
            for (k, v) in decode_json_body(bytes, lenient_quotes)? {
                params.insert(k, RawValue::from(v));
            }
        }
    }
    Ok(params)
}

fn decode_json_body(bytes: &[u8], lenient_quotes: bool) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let parsed = match serde_json::from_slice::<Value>(bytes) {
        Ok(v) => v,
        Err(strict) if lenient_quotes => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| ApiError::MalformedPayload(format!("body is not valid UTF-8: {}", e)))?;
            serde_json::from_str::<Value>(&text.replace('\'', "\""))
                .map_err(|_| ApiError::MalformedPayload(format!("body is not valid JSON: {}", strict)))?
        }
        Err(strict) => return Err(ApiError::MalformedPayload(format!("body is not valid JSON: {}", strict))),
    };
    match parsed {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::MalformedPayload("body must be a JSON object".into())),
    }
}
