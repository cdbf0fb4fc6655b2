use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options offered for the character status filter ("" means any)
pub const STATUS_OPTIONS: &[&str] = &["", "alive", "dead", "unknown"];

/// Options offered for the character gender filter ("" means any)
pub const GENDER_OPTIONS: &[&str] = &["", "female", "male", "genderless", "unknown"];

const CHARACTER_FIELDS: &[FieldSpec] = &[
  FieldSpec::text("name", "Name"),
  FieldSpec::select("status", "Status", STATUS_OPTIONS),
  FieldSpec::text("species", "Species"),
  FieldSpec::select("gender", "Gender", GENDER_OPTIONS),
];

const LOCATION_FIELDS: &[FieldSpec] = &[
  FieldSpec::text("name", "Name"),
  FieldSpec::text("type", "Type"),
  FieldSpec::text("dimension", "Dimension"),
];

/// Browsable entity category.
///
/// Acts as the descriptor for everything that differs between kinds: the
/// remote endpoint, the cache-key namespace, the persisted-storage keys and
/// the filter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  #[default]
  Characters,
  Locations,
}

impl ResourceKind {
  pub const ALL: [ResourceKind; 2] = [ResourceKind::Characters, ResourceKind::Locations];

  pub fn label(&self) -> &'static str {
    match self {
      ResourceKind::Characters => "Characters",
      ResourceKind::Locations => "Locations",
    }
  }

  /// Path segment on the remote API
  pub fn endpoint(&self) -> &'static str {
    match self {
      ResourceKind::Characters => "character",
      ResourceKind::Locations => "location",
    }
  }

  /// Prefix for cache keys, keeps kinds apart in the shared cache
  pub fn cache_namespace(&self) -> &'static str {
    match self {
      ResourceKind::Characters => "characters",
      ResourceKind::Locations => "locations",
    }
  }

  pub fn page_storage_key(&self) -> &'static str {
    match self {
      ResourceKind::Characters => "charactersPage",
      ResourceKind::Locations => "locationsPage",
    }
  }

  pub fn filters_storage_key(&self) -> &'static str {
    match self {
      ResourceKind::Characters => "characterFilters",
      ResourceKind::Locations => "locationFilters",
    }
  }

  /// Filter fields in display order
  pub fn fields(&self) -> &'static [FieldSpec] {
    match self {
      ResourceKind::Characters => CHARACTER_FIELDS,
      ResourceKind::Locations => LOCATION_FIELDS,
    }
  }

  pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
    self.fields().iter().find(|f| f.name == name)
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.cache_namespace())
  }
}

/// How a filter field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
  /// Typed character by character; debounced before fetching
  Text,
  /// Discrete choice; applied immediately
  Select(&'static [&'static str]),
}

/// A single filter field of a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: &'static str,
  pub label: &'static str,
  pub input: FieldInput,
}

impl FieldSpec {
  pub const fn text(name: &'static str, label: &'static str) -> Self {
    Self {
      name,
      label,
      input: FieldInput::Text,
    }
  }

  pub const fn select(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
  ) -> Self {
    Self {
      name,
      label,
      input: FieldInput::Select(options),
    }
  }

  pub fn is_debounced(&self) -> bool {
    matches!(self.input, FieldInput::Text)
  }
}

/// Name + URL reference to another resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
  pub name: String,
  #[serde(default)]
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub id: u32,
  pub name: String,
  pub status: String,
  pub species: String,
  /// Sub-species or variant, often empty
  #[serde(rename = "type", default)]
  pub variant: String,
  pub gender: String,
  pub origin: NamedRef,
  pub location: NamedRef,
  #[serde(default)]
  pub image: String,
  #[serde(rename = "episode", default)]
  pub episodes: Vec<String>,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub id: u32,
  pub name: String,
  #[serde(rename = "type", default)]
  pub location_type: String,
  #[serde(default)]
  pub dimension: String,
  #[serde(default)]
  pub residents: Vec<String>,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
}

impl Location {
  /// Character ids referenced by the resident URLs (`.../character/42`).
  /// URLs without a numeric tail are skipped.
  pub fn resident_ids(&self) -> Vec<u32> {
    self
      .residents
      .iter()
      .filter_map(|url| url.trim_end_matches('/').rsplit('/').next())
      .filter_map(|tail| tail.parse().ok())
      .collect()
  }
}

/// One list item, whichever kind it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
  Character(Character),
  Location(Location),
}


/// One page of a paginated collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
  pub items: Vec<Entity>,
  pub total_pages: u32,
  pub total_count: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_resident_ids_parses_trailing_segment() {
    let location = Location {
      id: 1,
      name: "Earth (C-137)".to_string(),
      location_type: "Planet".to_string(),
      dimension: "Dimension C-137".to_string(),
      residents: vec![
        "https://rickandmortyapi.com/api/character/38".to_string(),
        "https://rickandmortyapi.com/api/character/45/".to_string(),
        "https://rickandmortyapi.com/api/character/oops".to_string(),
      ],
      url: String::new(),
      created: None,
    };

    assert_eq!(location.resident_ids(), vec![38, 45]);
  }

  #[test]
  fn test_fields_mark_selects_as_immediate() {
    let status = ResourceKind::Characters.field("status").unwrap();
    assert!(!status.is_debounced());
    let name = ResourceKind::Characters.field("name").unwrap();
    assert!(name.is_debounced());
    assert!(ResourceKind::Locations.field("status").is_none());
    assert!(ResourceKind::Locations
      .fields()
      .iter()
      .all(FieldSpec::is_debounced));
  }

  #[test]
  fn test_character_deserializes_api_shape() {
    let json = r#"{
      "id": 1,
      "name": "Rick Sanchez",
      "status": "Alive",
      "species": "Human",
      "type": "",
      "gender": "Male",
      "origin": { "name": "Earth (C-137)", "url": "https://rickandmortyapi.com/api/location/1" },
      "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
      "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
      "episode": ["https://rickandmortyapi.com/api/episode/1"],
      "url": "https://rickandmortyapi.com/api/character/1",
      "created": "2017-11-04T18:48:46.250Z"
    }"#;

    let character: Character = serde_json::from_str(json).unwrap();
    assert_eq!(character.name, "Rick Sanchez");
    assert_eq!(character.origin.name, "Earth (C-137)");
    assert_eq!(character.episodes.len(), 1);
    assert!(character.created.is_some());
  }

  #[test]
  fn test_kind_descriptors_are_distinct() {
    let [a, b] = ResourceKind::ALL;
    assert_ne!(a.cache_namespace(), b.cache_namespace());
    assert_ne!(a.page_storage_key(), b.page_storage_key());
    assert_ne!(a.filters_storage_key(), b.filters_storage_key());
  }
}
