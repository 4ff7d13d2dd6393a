//! CrudService: the verb pipelines, plus field validation shared by them.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::{build_assignments, build_filter, FieldValidator};
