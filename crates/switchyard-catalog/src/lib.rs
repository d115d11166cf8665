//! Model catalog for Switchyard
//!
//! Loads model definitions from a directory of JSON files and serves lookups
//! by id. The catalog has no cluster side effects.

#![deny(missing_docs)]

mod catalog;
mod model;

pub use catalog::{CatalogError, ModelCatalog};
pub use model::{ModelDefinition, ModelSummary};
