//! Model API: a single-endpoint REST facade doing schema-validated CRUD over named models.

pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod normalize;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{load_from_path, load_from_str, resolve, EntityDescriptor, ModelRegistry, SchemaConfig, Verb};
pub use error::{ApiError, ConfigError, StoreError};
pub use normalize::{normalize, RawRequest, RequestParameters};
pub use response::{api_error_response, api_response, ApiResponse};
pub use routes::{api_routes, common_routes};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{EntityStore, MemoryStore, PgStore};

use axum::Router;

/// Facade plus health/ready/version routes on one router.
pub fn app(state: AppState) -> Router {
    api_routes(state.clone()).merge(common_routes(state))
}
