//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity descriptor.
//! Identifiers come only from validated schema config; values are always parameters.

use crate::config::{EntityDescriptor, Record, ScalarType};
use crate::error::StoreError;
use crate::query::{FilterClause, FilterSpec, Lookup};
use crate::sql::params::PgBindValue;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder, cast to the column type.
    fn push_param(&mut self, v: &Value, ty: ScalarType) -> String {
        self.params.push(PgBindValue::from_json(v));
        format!("${}::{}", self.params.len(), ty.pg_cast())
    }

    fn push_text(&mut self, s: String) -> String {
        self.params.push(PgBindValue::Text(s));
        format!("${}", self.params.len())
    }
}

/// SELECT list: every scalar field cast to its canonical type and aliased to the field name.
fn select_column_list(entity: &EntityDescriptor) -> String {
    entity
        .scalar_fields()
        .filter_map(|f| {
            f.scalar_type()
                .map(|t| format!("{}::{} AS {}", quoted(&f.column), t.pg_cast(), quoted(&f.name)))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn id_column(entity: &EntityDescriptor) -> (String, ScalarType) {
    entity
        .field(&entity.id_field)
        .map(|f| (f.column.clone(), f.scalar_type().unwrap_or(ScalarType::Integer)))
        .unwrap_or_else(|| (entity.id_field.clone(), ScalarType::Integer))
}

/// Escape LIKE wildcards in a user-supplied fragment.
fn like_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Unknown or relational fields are an error, never skipped.
fn where_part(entity: &EntityDescriptor, clause: &FilterClause, q: &mut QueryBuf) -> Result<String, StoreError> {
    let unfilterable = || StoreError::UnfilterableField {
        entity: entity.name.clone(),
        field: clause.field.clone(),
    };
    let field = entity.field(&clause.field).ok_or_else(unfilterable)?;
    let ty = field.scalar_type().ok_or_else(unfilterable)?;
    let col = quoted(&field.column);
    let text = || clause.value.as_str().map(String::from).unwrap_or_else(|| clause.value.to_string());
    Ok(match clause.lookup {
        Lookup::Exact if clause.value.is_null() => format!("{} IS NULL", col),
        Lookup::Exact => format!("{} = {}", col, q.push_param(&clause.value, ty)),
        Lookup::Gt => format!("{} > {}", col, q.push_param(&clause.value, ty)),
        Lookup::Gte => format!("{} >= {}", col, q.push_param(&clause.value, ty)),
        Lookup::Lt => format!("{} < {}", col, q.push_param(&clause.value, ty)),
        Lookup::Lte => format!("{} <= {}", col, q.push_param(&clause.value, ty)),
        Lookup::IExact => format!("LOWER({}::text) = LOWER({})", col, q.push_text(text())),
        Lookup::Contains => format!("{}::text LIKE {}", col, q.push_text(format!("%{}%", like_escape(&text())))),
        Lookup::IContains => format!("{}::text ILIKE {}", col, q.push_text(format!("%{}%", like_escape(&text())))),
        Lookup::StartsWith => format!("{}::text LIKE {}", col, q.push_text(format!("{}%", like_escape(&text())))),
        Lookup::EndsWith => format!("{}::text LIKE {}", col, q.push_text(format!("%{}", like_escape(&text())))),
    })
}

/// SELECT with filter clauses ANDed, ORDER BY id.
pub fn select_filtered(entity: &EntityDescriptor, filter: &FilterSpec) -> Result<QueryBuf, StoreError> {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::with_capacity(filter.clauses.len());
    for clause in &filter.clauses {
        where_parts.push(where_part(entity, clause, &mut q)?);
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let (id_col, _) = id_column(entity);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(entity),
        quoted(&entity.table),
        where_clause,
        quoted(&id_col)
    );
    Ok(q)
}

/// INSERT the supplied scalar fields; columns without a value take the database default.
pub fn insert(entity: &EntityDescriptor, fields: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in entity.scalar_fields() {
        let (Some(v), Some(ty)) = (fields.get(&f.name), f.scalar_type()) else {
            continue;
        };
        cols.push(quoted(&f.column));
        placeholders.push(q.push_param(v, ty));
    }
    let table = quoted(&entity.table);
    let returning = select_column_list(entity);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only scalar fields present in `fields`. `None` when nothing to set.
pub fn update(entity: &EntityDescriptor, id: &Value, fields: &Record) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in fields {
        let Some(f) = entity.field(k).filter(|f| !f.read_only) else {
            continue;
        };
        let Some(ty) = f.scalar_type() else { continue };
        let ph = q.push_param(v, ty);
        sets.push(format!("{} = {}", quoted(&f.column), ph));
    }
    if sets.is_empty() {
        return None;
    }
    let (id_col, id_ty) = id_column(entity);
    let id_ph = q.push_param(id, id_ty);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(&entity.table),
        sets.join(", "),
        quoted(&id_col),
        id_ph
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(entity: &EntityDescriptor, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let (id_col, id_ty) = id_column(entity);
    let id_ph = q.push_param(id, id_ty);
    q.sql = format!("DELETE FROM {} WHERE {} = {}", quoted(&entity.table), quoted(&id_col), id_ph);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_from_str, resolve, ModelRegistry};
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let config = load_from_str(
            r#"{"entities": [
                {"name": "Category", "fields": [{"name": "name", "type": "text"}]},
                {"name": "Project", "table": "api_project", "fields": [
                    {"name": "name", "type": "text"},
                    {"name": "stars", "type": "integer", "column": "star_count"},
                    {"name": "project_category", "type": "relation", "target": "Category"}
                ]}
            ]}"#,
        )
        .unwrap();
        resolve(&config).unwrap()
    }

    #[test]
    fn test_select_filtered() {
        let registry = registry();
        let project = registry.resolve("project").unwrap();
        let filter = FilterSpec {
            clauses: vec![
                FilterClause {
                    field: "stars".into(),
                    lookup: Lookup::Gte,
                    value: json!(3),
                },
                FilterClause {
                    field: "name".into(),
                    lookup: Lookup::IContains,
                    value: json!("50%"),
                },
            ],
        };
        let q = select_filtered(project, &filter).unwrap();
        assert_eq!(
            q.sql,
            "SELECT \"id\"::bigint AS \"id\", \"name\"::text AS \"name\", \"star_count\"::bigint AS \"stars\" \
             FROM \"api_project\" WHERE \"star_count\" >= $1::bigint AND \"name\"::text ILIKE $2 ORDER BY \"id\""
        );
        assert_eq!(q.params.len(), 2);
        assert!(matches!(&q.params[1], PgBindValue::Text(s) if s == "%50\\%%"));
    }

    #[test]
    fn test_select_all_has_no_where() {
        let registry = registry();
        let category = registry.resolve("category").unwrap();
        let q = select_filtered(category, &FilterSpec::default()).unwrap();
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_unfilterable_clause_is_an_error() {
        let registry = registry();
        let project = registry.resolve("project").unwrap();
        for field in ["project_category", "missing"] {
            let filter = FilterSpec::exact(field, json!(1));
            assert!(matches!(
                select_filtered(project, &filter),
                Err(StoreError::UnfilterableField { .. })
            ));
        }
    }

    #[test]
    fn test_insert_skips_relations_and_missing_fields() {
        let registry = registry();
        let project = registry.resolve("project").unwrap();
        let mut fields = Record::new();
        fields.insert("name".into(), json!("x"));
        let q = insert(project, &fields);
        assert!(q.sql.starts_with("INSERT INTO \"api_project\" (\"name\") VALUES ($1::text) RETURNING "));

        let q = insert(project, &Record::new());
        assert!(q.sql.starts_with("INSERT INTO \"api_project\" DEFAULT VALUES"));
    }

    #[test]
    fn test_update_and_delete_by_id() {
        let registry = registry();
        let category = registry.resolve("category").unwrap();
        let mut fields = Record::new();
        fields.insert("name".into(), json!("y"));
        let q = update(category, &json!(4), &fields).unwrap();
        assert_eq!(q.sql, "UPDATE \"category\" SET \"name\" = $1::text WHERE \"id\" = $2::bigint");
        assert!(update(category, &json!(4), &Record::new()).is_none());

        let q = delete(category, &json!(4));
        assert_eq!(q.sql, "DELETE FROM \"category\" WHERE \"id\" = $1::bigint");
    }
}
