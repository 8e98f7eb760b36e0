//! Wire types for the REST document API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{Constraint, Direction, Document, QueryDescriptor};

/// Body of a `documents:query` request.
#[derive(Debug, Serialize)]
pub struct ApiQuery {
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub constraints: Vec<ApiConstraint>,
}

impl ApiQuery {
  pub fn from_descriptor(query: &QueryDescriptor) -> Self {
    Self {
      constraints: query.constraints.iter().map(ApiConstraint::from).collect(),
    }
  }
}

/// Wire form of one query constraint.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiConstraint {
  WhereEq { field: String, value: Value },
  WhereContains { field: String, value: Value },
  OrderBy { field: String, direction: Direction },
  Limit { count: usize },
}

impl From<&Constraint> for ApiConstraint {
  fn from(constraint: &Constraint) -> Self {
    match constraint {
      Constraint::WhereEq { field, value } => Self::WhereEq {
        field: field.clone(),
        value: value.clone(),
      },
      Constraint::WhereContains { field, value } => Self::WhereContains {
        field: field.clone(),
        value: value.clone(),
      },
      Constraint::OrderBy { field, direction } => Self::OrderBy {
        field: field.clone(),
        direction: *direction,
      },
      Constraint::Limit(count) => Self::Limit { count: *count },
    }
  }
}

/// Body of a `documents:query` response.
#[derive(Debug, Deserialize)]
pub struct ApiQueryResponse {
  #[serde(default)]
  pub documents: Vec<ApiDocument>,
}

/// One document on the wire.
#[derive(Debug, Deserialize)]
pub struct ApiDocument {
  pub id: String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

impl From<ApiDocument> for Document {
  fn from(doc: ApiDocument) -> Self {
    Document::new(doc.id, doc.fields)
  }
}

/// Body of a document `PATCH` request.
#[derive(Debug, Serialize)]
pub struct ApiUpdateRequest {
  pub fields: Map<String, Value>,
}
