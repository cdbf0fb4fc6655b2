//! Catalog domain: resource kinds, entities, filters and the remote API.

mod api_types;
mod client;
mod error;
mod filters;
mod key;
mod source;
mod types;

pub use client::CatalogClient;
pub use error::FetchError;
pub use filters::{FilterPatch, FilterSet};
pub use key::build_key;
pub use source::PageSource;
pub use types::{
  Character, Entity, FieldInput, FieldSpec, Location, PageResult, ResourceKind,
};
