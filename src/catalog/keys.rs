//! Cache keys for catalog queries.

use sha2::{Digest, Sha256};

/// Logical identity of a catalog query, independent of wire details.
///
/// Filter values are folded into the key so that, say, two different tag
/// filters never share an entry.
#[derive(Clone, Debug)]
pub enum CatalogQueryKey {
  /// All published projects.
  Projects,
  /// Published projects in one category.
  ProjectsByCategory { category: String },
  /// Published projects carrying a tag.
  ProjectsByTag { tag: String },
  /// The ordered featured rail.
  Featured,
  /// A single project by id.
  ProjectDetail { id: String },
  /// All tags.
  Tags,
}

impl CatalogQueryKey {
  /// Stable, fixed-length cache key for this query.
  pub fn cache_key(&self) -> String {
    let input = match self {
      Self::Projects => "projects".to_string(),
      Self::ProjectsByCategory { category } => {
        format!("projects:category:{}", normalize(category))
      }
      Self::ProjectsByTag { tag } => format!("projects:tag:{}", normalize(tag)),
      Self::Featured => "projects:featured".to_string(),
      Self::ProjectDetail { id } => format!("project:{}", id),
      Self::Tags => "tags".to_string(),
    };

    // SHA256 for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Normalize user-facing filter values for consistent keys.
fn normalize(value: &str) -> String {
  value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_are_stable() {
    let a = CatalogQueryKey::ProjectsByTag {
      tag: "aerial".to_string(),
    };
    let b = CatalogQueryKey::ProjectsByTag {
      tag: "aerial".to_string(),
    };
    assert_eq!(a.cache_key(), b.cache_key());
  }

  #[test]
  fn different_queries_get_different_keys() {
    let keys = [
      CatalogQueryKey::Projects.cache_key(),
      CatalogQueryKey::Featured.cache_key(),
      CatalogQueryKey::Tags.cache_key(),
      CatalogQueryKey::ProjectsByTag {
        tag: "aerial".to_string(),
      }
      .cache_key(),
      CatalogQueryKey::ProjectsByCategory {
        category: "aerial".to_string(),
      }
      .cache_key(),
    ];

    for (i, key) in keys.iter().enumerate() {
      for other in &keys[i + 1..] {
        assert_ne!(key, other);
      }
    }
  }

  #[test]
  fn filter_values_are_normalized() {
    let a = CatalogQueryKey::ProjectsByTag {
      tag: " Aerial ".to_string(),
    };
    let b = CatalogQueryKey::ProjectsByTag {
      tag: "aerial".to_string(),
    };
    assert_eq!(a.cache_key(), b.cache_key());
  }
}
