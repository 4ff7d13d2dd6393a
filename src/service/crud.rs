//! Per-verb pipelines: resolve, validate, touch storage, build the envelope.

use super::validation::{build_assignments, build_filter, FieldValidator};
use crate::config::{EntityDescriptor, ModelRegistry, Record, Verb};
use crate::error::ApiError;
use crate::normalize::RequestParameters;
use crate::query::{parse_pairs, parse_values, FilterSpec, RawValue, SortSpec};
use crate::response::{api_models, api_ok, ApiResponse};
use crate::store::EntityStore;
use serde_json::Value;

const FILTER_PARAMS: [&str; 2] = ["filter", "model_id"];
const FIELDS_PARAMS: [&str; 2] = ["fields", "model_attrs"];

pub struct CrudService;

impl CrudService {
    /// Run the pipeline for `verb`.
    pub async fn execute(
        verb: Verb,
        registry: &ModelRegistry,
        store: &dyn EntityStore,
        params: &RequestParameters,
    ) -> Result<ApiResponse, ApiError> {
        match verb {
            Verb::Get => Self::get(registry, store, params).await,
            Verb::Post => Self::post(registry, store, params).await,
            Verb::Put => Self::put(registry, store, params).await,
            Verb::Delete => Self::delete(registry, store, params).await,
        }
    }

    /// List matching models, sorted. 404 when the result is empty.
    pub async fn get(
        registry: &ModelRegistry,
        store: &dyn EntityStore,
        params: &RequestParameters,
    ) -> Result<ApiResponse, ApiError> {
        let model = require_model(params)?;
        let entity = resolve(registry, &model, Verb::Get)?;

        let filter = match params.first_of(&FILTER_PARAMS) {
            Some((name, raw)) => filter_for(entity, name, raw)?,
            None => FilterSpec::default(),
        };
        let sort = match params.get("sort") {
            Some(raw) => {
                let values = parse_values(raw).map_err(|e| ApiError::MalformedSort(e.to_string()))?;
                SortSpec::from_values(&values)
            }
            None => SortSpec::default(),
        };
        FieldValidator::validate_sort(&sort, entity)?;

        let mut records = if filter.is_empty() {
            store.fetch_all(entity).await?
        } else {
            store.fetch_filtered(entity, &filter).await?
        };
        sort.apply(&mut records);

        Ok(api_models(records.iter().map(|r| entity.serialize(r)).collect()))
    }

    /// Create one model; fields not supplied take their defaults.
    pub async fn post(
        registry: &ModelRegistry,
        store: &dyn EntityStore,
        params: &RequestParameters,
    ) -> Result<ApiResponse, ApiError> {
        let model = require_model(params)?;
        let entity = resolve(registry, &model, Verb::Post)?;

        let mut record = entity.defaults();
        if let Some((_, raw)) = params.first_of(&FIELDS_PARAMS) {
            record.extend(assignments_for(entity, raw)?);
        }
        let created = store.create(entity, record).await?;
        tracing::debug!(model = %entity.name, id = ?entity.id_of(&created), "created");
        Ok(api_ok())
    }

    /// Update the single model matched by the filter.
    pub async fn put(
        registry: &ModelRegistry,
        store: &dyn EntityStore,
        params: &RequestParameters,
    ) -> Result<ApiResponse, ApiError> {
        let model = require_model(params)?;
        let (filter_name, filter_raw) = params
            .first_of(&FILTER_PARAMS)
            .ok_or_else(|| ApiError::missing("filter"))?;
        let (_, fields_raw) = params
            .first_of(&FIELDS_PARAMS)
            .ok_or_else(|| ApiError::missing("fields"))?;
        let entity = resolve(registry, &model, Verb::Put)?;

        let filter = filter_for(entity, filter_name, filter_raw)?;
        let assignments = assignments_for(entity, fields_raw)?;
        let instance = fetch_one(store, entity, &filter).await?;
        store.update(entity, &instance, assignments).await?;
        Ok(api_ok())
    }

    /// Delete the single model matched by the filter.
    pub async fn delete(
        registry: &ModelRegistry,
        store: &dyn EntityStore,
        params: &RequestParameters,
    ) -> Result<ApiResponse, ApiError> {
        let model = require_model(params)?;
        let (filter_name, filter_raw) = params
            .first_of(&FILTER_PARAMS)
            .ok_or_else(|| ApiError::missing("filter"))?;
        let entity = resolve(registry, &model, Verb::Delete)?;

        let filter = filter_for(entity, filter_name, filter_raw)?;
        let instance = fetch_one(store, entity, &filter).await?;
        store.delete(entity, &instance).await?;
        Ok(api_ok())
    }
}

fn require_model(params: &RequestParameters) -> Result<String, ApiError> {
    params
        .get("model")
        .and_then(RawValue::as_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::missing("model"))
}

fn resolve<'r>(registry: &'r ModelRegistry, model: &str, verb: Verb) -> Result<&'r EntityDescriptor, ApiError> {
    let entity = registry
        .resolve(model)
        .ok_or_else(|| ApiError::ModelNotFound(model.to_string()))?;
    if !entity.allows(verb) {
        return Err(ApiError::MethodNotAllowed {
            entity: entity.name.clone(),
            verb: verb.to_string(),
        });
    }
    Ok(entity)
}

/// `filter` uses the pair-list grammar; legacy `model_id` is an exact match on the id field.
fn filter_for(entity: &EntityDescriptor, param: &str, raw: &RawValue) -> Result<FilterSpec, ApiError> {
    let pairs = if param == "model_id" {
        let id = match raw {
            RawValue::Encoded(s) => Value::String(s.trim().to_string()),
            RawValue::Scalar(v) => v.clone(),
            RawValue::Map(_) | RawValue::List(_) => {
                return Err(ApiError::MalformedFilter("model_id must be a single value".into()))
            }
        };
        vec![(entity.id_field.clone(), id)]
    } else {
        parse_pairs(raw).map_err(|e| ApiError::MalformedFilter(e.to_string()))?
    };
    build_filter(entity, &pairs)
}

fn assignments_for(entity: &EntityDescriptor, raw: &RawValue) -> Result<Record, ApiError> {
    let pairs = parse_pairs(raw).map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
    build_assignments(entity, &pairs)
}

/// Exactly one match, or a distinct error for none and for several.
async fn fetch_one(
    store: &dyn EntityStore,
    entity: &EntityDescriptor,
    filter: &FilterSpec,
) -> Result<Record, ApiError> {
    let mut matches = store.fetch_filtered(entity, filter).await?;
    match matches.len() {
        0 => Err(ApiError::NoMatch(entity.name.clone())),
        1 => Ok(matches.remove(0)),
        count => Err(ApiError::AmbiguousMatch {
            entity: entity.name.clone(),
            count,
        }),
    }
}
