//! HTTP handlers for the facade endpoint.

pub mod api;
pub use api::dispatch;
