//! Core types for the document-store abstraction.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document snapshot: an id plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub fields: Map<String, Value>,
}

impl Document {
  pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
    Self {
      id: id.into(),
      fields,
    }
  }

  /// Deserialize the field map, with the document id injected under `"id"`,
  /// into a typed value.
  pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
    let mut object = self.fields.clone();
    object.insert("id".to_string(), Value::String(self.id.clone()));
    serde_json::from_value(Value::Object(object))
  }
}

/// Sort direction for an `OrderBy` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Asc,
  Desc,
}

/// One filter/sort/limit step of a query.
///
/// The fetch layer passes constraints through untouched; only the store
/// backend interprets them.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
  /// Field equals the given value.
  WhereEq { field: String, value: Value },
  /// Array field contains the given value.
  WhereContains { field: String, value: Value },
  /// Order results by a field.
  OrderBy { field: String, direction: Direction },
  /// Cap the number of returned documents.
  Limit(usize),
}

/// A query against one collection: an ordered constraint list plus an
/// optional explicit cache key.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
  pub collection: String,
  pub constraints: Vec<Constraint>,
  pub cache_key: Option<String>,
}

impl QueryDescriptor {
  /// Query all documents of a collection.
  pub fn collection(name: impl Into<String>) -> Self {
    Self {
      collection: name.into(),
      constraints: Vec::new(),
      cache_key: None,
    }
  }

  /// Append a constraint. Order is preserved on the wire.
  pub fn with_constraint(mut self, constraint: Constraint) -> Self {
    self.constraints.push(constraint);
    self
  }

  /// Cache the result under an explicit key instead of the collection name.
  pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
    self.cache_key = Some(key.into());
    self
  }

  /// The key this query's results are cached under.
  pub fn effective_cache_key(&self) -> &str {
    self.cache_key.as_deref().unwrap_or(&self.collection)
  }
}
