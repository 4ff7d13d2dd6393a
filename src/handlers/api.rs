//! The single facade entry point: every verb on `/api/` lands here.

use crate::config::Verb;
use crate::error::ApiError;
use crate::normalize::{normalize, RawRequest};
use crate::response::{api_error_response, ApiResponse};
use crate::service::CrudService;
use crate::state::AppState;
use axum::extract::State;

/// Map a request to its verb pipeline and turn every outcome into the envelope.
pub async fn dispatch(State(state): State<AppState>, raw: RawRequest) -> ApiResponse {
    let Some(verb) = Verb::from_method(&raw.method) else {
        let err = ApiError::UnsupportedMethod(raw.method.to_string());
        report(&state, "HTTP", &err);
        return api_error_response("HTTP", &err);
    };
    tracing::debug!(verb = %verb, query = ?raw.query, "dispatch");

    let outcome = match normalize(&raw, state.settings.lenient_quotes) {
        Ok(params) => CrudService::execute(verb, &state.registry, state.store.as_ref(), &params).await,
        Err(e) => Err(e),
    };
    outcome.unwrap_or_else(|err| {
        report(&state, verb.as_str(), &err);
        api_error_response(verb.as_str(), &err)
    })
}

fn report(state: &AppState, label: &str, err: &ApiError) {
    if state.settings.debug {
        tracing::error!(status = err.status_code().as_u16(), "{} - {}", label, err);
    }
}
