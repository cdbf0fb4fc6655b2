use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::ResourceKind;

/// Filter values for one resource kind, keyed by field name.
///
/// Blank values mean "no constraint". Equality is field-wise string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
  values: BTreeMap<String, String>,
}

impl FilterSet {
  /// All fields of `kind`, blank
  pub fn for_kind(kind: ResourceKind) -> Self {
    Self {
      values: kind
        .fields()
        .iter()
        .map(|f| (f.name.to_string(), String::new()))
        .collect(),
    }
  }

  /// Value of a field; blank when the field is unset
  pub fn get(&self, field: &str) -> &str {
    self.values.get(field).map(String::as_str).unwrap_or("")
  }

  /// Set a field, returning whether the stored value changed
  pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
    let value = value.into();
    match self.values.get_mut(field) {
      Some(current) if *current == value => false,
      Some(current) => {
        *current = value;
        true
      }
      None => {
        self.values.insert(field.to_string(), value);
        true
      }
    }
  }

  /// All (field, value) pairs, blank ones included
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Pairs with a non-empty value, sorted by field name
  pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
    self.iter().filter(|(_, v)| !v.is_empty())
  }

  pub fn has_active(&self) -> bool {
    self.active().next().is_some()
  }

  /// Copy values of fields known to `kind` from `other`; everything else is
  /// dropped. Used when restoring persisted filters that may predate a
  /// field change.
  pub fn merge_known(&mut self, kind: ResourceKind, other: &FilterSet) {
    for field in kind.fields() {
      if let Some(value) = other.values.get(field.name) {
        self.set(field.name, value.clone());
      }
    }
  }
}

/// Partial filter update: only the listed fields change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
  changes: Vec<(String, String)>,
}

impl FilterPatch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
    self.changes.push((field.into(), value.into()));
    self
  }

  /// Blank every field of `kind`
  pub fn clear(kind: ResourceKind) -> Self {
    kind
      .fields()
      .iter()
      .map(|f| (f.name, ""))
      .collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.changes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl<K, V> FromIterator<(K, V)> for FilterPatch
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      changes: iter
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }
}
