//! In-process store: one table of JSON records per entity.

use super::EntityStore;
use crate::config::{EntityDescriptor, Record, ScalarType};
use crate::error::StoreError;
use crate::query::FilterSpec;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: Vec<Record>,
}

impl Table {
    fn note_id(&mut self, id: Option<&Value>) {
        if let Some(n) = id.and_then(Value::as_i64) {
            self.last_id = self.last_id.max(n);
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    /// Load rows as-is, without id assignment or uniqueness checks.
    pub fn seed(&self, entity: &EntityDescriptor, rows: Vec<Record>) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let table = tables.entry(entity.name.clone()).or_default();
        for row in rows {
            table.note_id(row.get(&entity.id_field));
            table.rows.push(row);
        }
        Ok(())
    }

    /// Raw rows for an entity, in insertion order.
    pub fn rows(&self, entity: &EntityDescriptor) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .read()?
            .get(&entity.name)
            .map(|t| t.rows.clone())
            .unwrap_or_default())
    }

    fn next_id(entity: &EntityDescriptor, table: &mut Table) -> Value {
        let kind = entity.field(&entity.id_field).and_then(|f| f.scalar_type());
        match kind {
            Some(ScalarType::Uuid) => Value::String(uuid::Uuid::new_v4().to_string()),
            Some(ScalarType::Text) => {
                table.last_id += 1;
                Value::String(table.last_id.to_string())
            }
            _ => {
                table.last_id += 1;
                Value::Number(table.last_id.into())
            }
        }
    }

    fn id_of(entity: &EntityDescriptor, instance: &Record) -> Result<Value, StoreError> {
        entity
            .id_of(instance)
            .cloned()
            .ok_or_else(|| StoreError::MissingId(entity.id_field.clone()))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn fetch_all(&self, entity: &EntityDescriptor) -> Result<Vec<Record>, StoreError> {
        self.rows(entity)
    }

    async fn fetch_filtered(
        &self,
        entity: &EntityDescriptor,
        filter: &FilterSpec,
    ) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .read()?
            .get(&entity.name)
            .map(|t| t.rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn create(&self, entity: &EntityDescriptor, mut fields: Record) -> Result<Record, StoreError> {
        let mut tables = self.write()?;
        let table = tables.entry(entity.name.clone()).or_default();
        if let Some(id) = entity.id_of(&fields).cloned() {
            table.note_id(Some(&id));
        } else {
            let id = Self::next_id(entity, table);
            fields.insert(entity.id_field.clone(), id);
        }
        table.rows.push(fields.clone());
        Ok(fields)
    }

    async fn update(
        &self,
        entity: &EntityDescriptor,
        instance: &Record,
        fields: Record,
    ) -> Result<(), StoreError> {
        let id = Self::id_of(entity, instance)?;
        let mut tables = self.write()?;
        let rows = tables
            .get_mut(&entity.name)
            .map(|t| &mut t.rows)
            .ok_or_else(|| StoreError::Backend(format!("no rows stored for {}", entity.name)))?;
        let mut touched = 0;
        for row in rows.iter_mut().filter(|r| r.get(&entity.id_field) == Some(&id)) {
            for (k, v) in &fields {
                row.insert(k.clone(), v.clone());
            }
            touched += 1;
        }
        if touched == 0 {
            return Err(StoreError::Backend(format!("{} {} no longer exists", entity.name, id)));
        }
        Ok(())
    }

    async fn delete(&self, entity: &EntityDescriptor, instance: &Record) -> Result<(), StoreError> {
        let id = Self::id_of(entity, instance)?;
        let mut tables = self.write()?;
        if let Some(table) = tables.get_mut(&entity.name) {
            table.rows.retain(|r| r.get(&entity.id_field) != Some(&id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_from_str, resolve, ModelRegistry};
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let config = load_from_str(
            r#"{"entities": [{"name": "Category", "fields": [{"name": "name", "type": "text"}]}]}"#,
        )
        .unwrap();
        resolve(&config).unwrap()
    }

    fn record(v: Value) -> Record {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let registry = registry();
        let category = registry.resolve("category").unwrap();
        let store = MemoryStore::new();
        let a = store.create(category, record(json!({"name": "a"}))).await.unwrap();
        let b = store.create(category, record(json!({"name": "b"}))).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert_eq!(store.fetch_all(category).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_advances_id_counter() {
        let registry = registry();
        let category = registry.resolve("category").unwrap();
        let store = MemoryStore::new();
        store
            .seed(category, vec![record(json!({"id": 7, "name": "x"}))])
            .unwrap();
        let created = store.create(category, record(json!({"name": "y"}))).await.unwrap();
        assert_eq!(created["id"], json!(8));
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let registry = registry();
        let category = registry.resolve("category").unwrap();
        let store = MemoryStore::new();
        let a = store.create(category, record(json!({"name": "a"}))).await.unwrap();
        store
            .update(category, &a, record(json!({"name": "z"})))
            .await
            .unwrap();
        let found = store
            .fetch_filtered(category, &FilterSpec::exact("name", json!("z")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        store.delete(category, &a).await.unwrap();
        assert!(store.fetch_all(category).await.unwrap().is_empty());
        assert!(store
            .update(category, &a, record(json!({"name": "q"})))
            .await
            .is_err());
    }
}
