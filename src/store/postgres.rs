//! PostgreSQL store via sqlx. Tables are expected to exist; no DDL is issued.

use super::EntityStore;
use crate::config::{EntityDescriptor, Record, ScalarType};
use crate::error::StoreError;
use crate::query::FilterSpec;
use crate::sql::{delete, insert, select_filtered, update, QueryBuf};
use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(PgStore { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn query_many(&self, entity: &EntityDescriptor, q: &QueryBuf) -> Result<Vec<Record>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_record(entity, r)).collect()
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    fn id_of(entity: &EntityDescriptor, instance: &Record) -> Result<Value, StoreError> {
        entity
            .id_of(instance)
            .cloned()
            .ok_or_else(|| StoreError::MissingId(entity.id_field.clone()))
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn fetch_all(&self, entity: &EntityDescriptor) -> Result<Vec<Record>, StoreError> {
        self.fetch_filtered(entity, &FilterSpec::default()).await
    }

    async fn fetch_filtered(
        &self,
        entity: &EntityDescriptor,
        filter: &FilterSpec,
    ) -> Result<Vec<Record>, StoreError> {
        let q = select_filtered(entity, filter)?;
        self.query_many(entity, &q).await
    }

    async fn create(&self, entity: &EntityDescriptor, fields: Record) -> Result<Record, StoreError> {
        let q = insert(entity, &fields);
        self.query_many(entity, &q)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(
        &self,
        entity: &EntityDescriptor,
        instance: &Record,
        fields: Record,
    ) -> Result<(), StoreError> {
        let id = Self::id_of(entity, instance)?;
        let Some(q) = update(entity, &id, &fields) else {
            return Ok(());
        };
        if self.execute(&q).await? == 0 {
            return Err(StoreError::Backend(format!("{} {} no longer exists", entity.name, id)));
        }
        Ok(())
    }

    async fn delete(&self, entity: &EntityDescriptor, instance: &Record) -> Result<(), StoreError> {
        let id = Self::id_of(entity, instance)?;
        self.execute(&delete(entity, &id)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

/// Decode a row into a record. Columns are selected cast to each field's type and
/// aliased to the field name, so decoding is driven by the descriptor alone.
fn row_to_record(entity: &EntityDescriptor, row: &PgRow) -> Result<Record, StoreError> {
    let mut record = Record::new();
    for f in entity.scalar_fields() {
        let Some(ty) = f.scalar_type() else { continue };
        record.insert(f.name.clone(), cell_to_value(row, &f.name, ty)?);
    }
    Ok(record)
}

fn cell_to_value(row: &PgRow, name: &str, ty: ScalarType) -> Result<Value, sqlx::Error> {
    let v = match ty {
        ScalarType::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
        ScalarType::Integer => row.try_get::<Option<i64>, _>(name)?.map(|n| Value::Number(n.into())),
        ScalarType::Float => row
            .try_get::<Option<f64>, _>(name)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        ScalarType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        ScalarType::Timestamp => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)?
            .map(|d| Value::String(d.to_rfc3339())),
        ScalarType::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(name)?
            .map(|u| Value::String(u.to_string())),
    };
    Ok(v.unwrap_or(Value::Null))
}
