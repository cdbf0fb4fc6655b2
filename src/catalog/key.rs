//! Cache keys for list pages.

use url::form_urlencoded::byte_serialize;

use super::filters::FilterSet;
use super::types::ResourceKind;

/// Build the cache key for a page of `kind` under `filters`.
///
/// Blank filters are skipped and the remaining `field=value` pairs are sorted
/// by field name, so the key does not depend on the order fields were set in.
/// Fields and values are form-encoded, so a `,` or `=` typed into a filter
/// cannot pass for a separator. An unfiltered page has no pair suffix at all:
/// `characters_2`.
pub fn build_key(kind: ResourceKind, page: u32, filters: &FilterSet) -> String {
  let mut pairs: Vec<(&str, &str)> = filters.active().collect();
  pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

  if pairs.is_empty() {
    return format!("{}_{}", kind.cache_namespace(), page);
  }

  let joined = pairs
    .iter()
    .map(|(field, value)| format!("{}={}", encode(field), encode(value)))
    .collect::<Vec<_>>()
    .join(",");

  format!("{}_{}_{}", kind.cache_namespace(), page, joined)
}

fn encode(s: &str) -> String {
  byte_serialize(s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filters(pairs: &[(&str, &str)]) -> FilterSet {
    let mut set = FilterSet::default();
    for (k, v) in pairs {
      set.set(k, *v);
    }
    set
  }

  #[test]
  fn test_key_ignores_insertion_order() {
    let a = filters(&[("name", "rick"), ("status", "alive"), ("gender", "male")]);
    let b = filters(&[("gender", "male"), ("name", "rick"), ("status", "alive")]);
    assert_eq!(
      build_key(ResourceKind::Characters, 1, &a),
      build_key(ResourceKind::Characters, 1, &b)
    );
  }

  #[test]
  fn test_key_skips_blank_fields() {
    let sparse = filters(&[("name", "rick")]);
    let padded = filters(&[("name", "rick"), ("species", ""), ("status", "")]);
    assert_eq!(
      build_key(ResourceKind::Characters, 3, &sparse),
      build_key(ResourceKind::Characters, 3, &padded)
    );
    assert_eq!(
      build_key(ResourceKind::Characters, 3, &sparse),
      "characters_3_name=rick"
    );
  }

  #[test]
  fn test_unfiltered_key_has_no_suffix() {
    let blank = FilterSet::for_kind(ResourceKind::Locations);
    assert_eq!(build_key(ResourceKind::Locations, 1, &blank), "locations_1");

    let filtered = filters(&[("type", "planet")]);
    let key = build_key(ResourceKind::Locations, 1, &filtered);
    assert!(key.starts_with("locations_1_"));
    assert_ne!(key, "locations_1");
  }

  #[test]
  fn test_separator_characters_in_values_do_not_collide() {
    let typed = filters(&[("name", "rick,status=dead")]);
    let selected = filters(&[("name", "rick"), ("status", "dead")]);
    assert_ne!(
      build_key(ResourceKind::Characters, 1, &typed),
      build_key(ResourceKind::Characters, 1, &selected)
    );
    assert_eq!(
      build_key(ResourceKind::Characters, 1, &selected),
      "characters_1_name=rick,status=dead"
    );
  }

  #[test]
  fn test_key_separates_pages_and_kinds() {
    let name = filters(&[("name", "earth")]);
    let keys = [
      build_key(ResourceKind::Characters, 1, &name),
      build_key(ResourceKind::Characters, 2, &name),
      build_key(ResourceKind::Locations, 1, &name),
    ];
    assert_ne!(keys[0], keys[1]);
    assert_ne!(keys[0], keys[2]);
  }
}
