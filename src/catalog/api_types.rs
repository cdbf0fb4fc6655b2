//! Wire formats of the catalog API.

use serde::Deserialize;

use super::types::{Entity, PageResult};

/// Paginated collection envelope: `{ info: {...}, results: [...] }`
#[derive(Debug, Deserialize)]
pub struct ApiPage<T> {
  pub info: ApiInfo,
  pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiInfo {
  pub count: u32,
  pub pages: u32,
  #[serde(default)]
  pub next: Option<String>,
  #[serde(default)]
  pub prev: Option<String>,
}

impl<T> ApiPage<T> {
  pub fn into_page_result(self, wrap: fn(T) -> Entity) -> PageResult {
    PageResult {
      items: self.results.into_iter().map(wrap).collect(),
      total_pages: self.info.pages,
      total_count: self.info.count,
    }
  }
}

/// Multi-id lookups answer with a bare object when exactly one id is asked for
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
  Many(Vec<T>),
  One(T),
}

impl<T> OneOrMany<T> {
  pub fn into_vec(self) -> Vec<T> {
    match self {
      OneOrMany::Many(items) => items,
      OneOrMany::One(item) => vec![item],
    }
  }
}
