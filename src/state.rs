//! Shared application state for all routes. Built once at startup, read-only afterwards.

use crate::config::ModelRegistry;
use crate::settings::Settings;
use crate::store::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub store: Arc<dyn EntityStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, store: Arc<dyn EntityStore>, settings: Settings) -> Self {
        AppState {
            registry: Arc::new(registry),
            store,
            settings: Arc::new(settings),
        }
    }
}
