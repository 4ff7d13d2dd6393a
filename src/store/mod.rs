//! Storage collaborators. The facade only talks to storage through [`EntityStore`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::{EntityDescriptor, Record};
use crate::error::StoreError;
use crate::query::FilterSpec;
use async_trait::async_trait;

/// Storage operations for entity records. Implementations own their own
/// transaction and locking discipline.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn fetch_all(&self, entity: &EntityDescriptor) -> Result<Vec<Record>, StoreError>;

    async fn fetch_filtered(
        &self,
        entity: &EntityDescriptor,
        filter: &FilterSpec,
    ) -> Result<Vec<Record>, StoreError>;

    /// Persist a new record built from `fields`; returns it with its assigned id.
    async fn create(&self, entity: &EntityDescriptor, fields: Record) -> Result<Record, StoreError>;

    async fn update(
        &self,
        entity: &EntityDescriptor,
        instance: &Record,
        fields: Record,
    ) -> Result<(), StoreError>;

    async fn delete(&self, entity: &EntityDescriptor, instance: &Record) -> Result<(), StoreError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    fn kind(&self) -> &'static str;
}
