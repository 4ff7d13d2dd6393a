//! Capture method, query string and body of a facade request without rejecting it.
//! Decoding failures are carried along so the handler can report them in its envelope.

use crate::normalize::{RawBody, RawRequest, Rejection};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form,
};
use std::convert::Infallible;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Length-limit failures keep their own kind so they surface as 413.
fn body_rejection(what: &str, status: StatusCode, text: String) -> Rejection {
    let reason = format!("{}: {}", what, text);
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        Rejection::TooLarge(reason)
    } else {
        Rejection::Malformed(reason)
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for RawRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let mut rejection = None;

        let query = match Query::<Vec<(String, String)>>::try_from_uri(req.uri()) {
            Ok(Query(pairs)) => pairs,
            Err(e) => {
                rejection = Some(Rejection::Malformed(format!("query string: {}", e.body_text())));
                Vec::new()
            }
        };

        let body = if is_form(&req) && method != axum::http::Method::GET {
            match Form::<Vec<(String, String)>>::from_request(req, state).await {
                Ok(Form(pairs)) => RawBody::Form(pairs),
                Err(e) => {
                    rejection.get_or_insert(body_rejection("form body", e.status(), e.body_text()));
                    RawBody::Empty
                }
            }
        } else {
            match Bytes::from_request(req, state).await {
                Ok(bytes) if bytes.is_empty() => RawBody::Empty,
                Ok(bytes) => RawBody::Text(bytes),
                Err(e) => {
                    rejection.get_or_insert(body_rejection("body", e.status(), e.body_text()));
                    RawBody::Empty
                }
            }
        };

        Ok(RawRequest {
            method,
            query,
            body,
            rejection,
        })
    }
}
