//! Typed catalog API over the fetch layer.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::cache::{QueryExecutor, ScopeHandle};
use crate::error::{FetchError, RemoteError};
use crate::remote::{Constraint, Direction, Document, DocumentStore, QueryDescriptor};

use super::import::{read_gallery_csv, ImportError};
use super::keys::CatalogQueryKey;
use super::types::{GalleryImage, Project, Tag};

/// Collection names in the content database.
const PROJECTS: &str = "projects";
const TAGS: &str = "tags";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("failed to decode document {id}: {source}")]
  Decode {
    id: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to encode fields: {0}")]
  Encode(#[from] serde_json::Error),

  #[error(transparent)]
  Import(#[from] ImportError),

  #[error("unknown project: {0}")]
  UnknownProject(String),

  #[error("new order must be a permutation of the current gallery")]
  NotAPermutation,

  #[error("write failed: {0}")]
  Write(#[from] RemoteError),
}

/// Catalog client with transparent caching.
///
/// Read operations go through the executor and share its cache; write
/// operations go straight to the remote store and invalidate the keys they
/// touch. The service owns its scope, so fetches stay live as long as the
/// service does.
pub struct CatalogService<S> {
  executor: Arc<QueryExecutor<S>>,
  scope: ScopeHandle,
}

impl<S: DocumentStore> CatalogService<S> {
  pub fn new(executor: Arc<QueryExecutor<S>>) -> Self {
    Self {
      executor,
      scope: ScopeHandle::new(),
    }
  }

  /// All published projects, newest first.
  pub async fn list_projects(&self) -> Result<Vec<Project>, CatalogError> {
    let query = QueryDescriptor::collection(PROJECTS)
      .with_constraint(Constraint::WhereEq {
        field: "published".to_string(),
        value: json!(true),
      })
      .with_constraint(Constraint::OrderBy {
        field: "year".to_string(),
        direction: Direction::Desc,
      })
      .with_cache_key(CatalogQueryKey::Projects.cache_key());

    self.fetch_rows(query).await
  }

  /// Published projects in one category.
  pub async fn projects_by_category(&self, category: &str) -> Result<Vec<Project>, CatalogError> {
    let query = QueryDescriptor::collection(PROJECTS)
      .with_constraint(Constraint::WhereEq {
        field: "published".to_string(),
        value: json!(true),
      })
      .with_constraint(Constraint::WhereEq {
        field: "category".to_string(),
        value: json!(category),
      })
      .with_cache_key(
        CatalogQueryKey::ProjectsByCategory {
          category: category.to_string(),
        }
        .cache_key(),
      );

    self.fetch_rows(query).await
  }

  /// Published projects carrying the given tag.
  pub async fn projects_by_tag(&self, tag: &str) -> Result<Vec<Project>, CatalogError> {
    let query = QueryDescriptor::collection(PROJECTS)
      .with_constraint(Constraint::WhereEq {
        field: "published".to_string(),
        value: json!(true),
      })
      .with_constraint(Constraint::WhereContains {
        field: "tags".to_string(),
        value: json!(tag),
      })
      .with_cache_key(CatalogQueryKey::ProjectsByTag { tag: tag.to_string() }.cache_key());

    self.fetch_rows(query).await
  }

  /// The featured rail, in display order.
  pub async fn featured_projects(&self) -> Result<Vec<Project>, CatalogError> {
    let query = QueryDescriptor::collection(PROJECTS)
      .with_constraint(Constraint::WhereEq {
        field: "featured".to_string(),
        value: json!(true),
      })
      .with_constraint(Constraint::OrderBy {
        field: "featured_position".to_string(),
        direction: Direction::Asc,
      })
      .with_cache_key(CatalogQueryKey::Featured.cache_key());

    self.fetch_rows(query).await
  }

  /// One project by id.
  pub async fn get_project(&self, id: &str) -> Result<Project, CatalogError> {
    let query = QueryDescriptor::collection(PROJECTS)
      .with_constraint(Constraint::WhereEq {
        field: "id".to_string(),
        value: json!(id),
      })
      .with_constraint(Constraint::Limit(1))
      .with_cache_key(CatalogQueryKey::ProjectDetail { id: id.to_string() }.cache_key());

    let mut projects: Vec<Project> = self.fetch_rows(query).await?;
    match projects.pop() {
      Some(project) => Ok(project),
      None => Err(CatalogError::UnknownProject(id.to_string())),
    }
  }

  /// All tags, alphabetical.
  pub async fn list_tags(&self) -> Result<Vec<Tag>, CatalogError> {
    let query = QueryDescriptor::collection(TAGS)
      .with_constraint(Constraint::OrderBy {
        field: "name".to_string(),
        direction: Direction::Asc,
      })
      .with_cache_key(CatalogQueryKey::Tags.cache_key());

    self.fetch_rows(query).await
  }

  /// Append images from a CSV file to the project's gallery.
  ///
  /// Returns the number of imported images.
  pub async fn import_gallery_csv(
    &self,
    project_id: &str,
    csv_path: &Path,
  ) -> Result<usize, CatalogError> {
    let imported = read_gallery_csv(csv_path)?;
    self.append_gallery_images(project_id, imported).await
  }

  /// Append images to the project's gallery and persist the result.
  pub async fn append_gallery_images(
    &self,
    project_id: &str,
    images: Vec<GalleryImage>,
  ) -> Result<usize, CatalogError> {
    if images.is_empty() {
      return Ok(0);
    }

    let count = images.len();
    let mut project = self.get_project(project_id).await?;
    project.gallery.extend(images);
    self.write_gallery(project_id, &project.gallery).await?;

    info!(project = %project_id, count, "imported gallery images");
    Ok(count)
  }

  /// Persist a new gallery order. `new_order` must list exactly the current
  /// gallery urls.
  pub async fn reorder_gallery(
    &self,
    project_id: &str,
    new_order: &[String],
  ) -> Result<(), CatalogError> {
    let project = self.get_project(project_id).await?;
    let reordered =
      reorder_by_url(&project.gallery, new_order).ok_or(CatalogError::NotAPermutation)?;

    self.write_gallery(project_id, &reordered).await
  }

  /// Persist featured positions for the given ordered project ids.
  pub async fn set_featured_order(&self, ordered_ids: &[String]) -> Result<(), CatalogError> {
    for (position, id) in ordered_ids.iter().enumerate() {
      let mut fields = Map::new();
      fields.insert("featured".to_string(), json!(true));
      fields.insert("featured_position".to_string(), json!(position as u32));
      self
        .executor
        .remote()
        .update_fields(PROJECTS, id, fields)
        .await?;
    }

    let store = self.executor.store();
    store.invalidate(&CatalogQueryKey::Projects.cache_key());
    store.invalidate(&CatalogQueryKey::Featured.cache_key());
    for id in ordered_ids {
      store.invalidate(&CatalogQueryKey::ProjectDetail { id: id.clone() }.cache_key());
    }

    Ok(())
  }

  async fn fetch_rows<T: DeserializeOwned>(
    &self,
    query: QueryDescriptor,
  ) -> Result<Vec<T>, CatalogError> {
    let outcome = self.executor.fetch(&query, &self.scope.scope()).await?;
    decode(&outcome.docs)
  }

  async fn write_gallery(
    &self,
    project_id: &str,
    gallery: &[GalleryImage],
  ) -> Result<(), CatalogError> {
    let mut fields = Map::new();
    fields.insert("gallery".to_string(), serde_json::to_value(gallery)?);

    self
      .executor
      .remote()
      .update_fields(PROJECTS, project_id, fields)
      .await?;

    let store = self.executor.store();
    store.invalidate(&CatalogQueryKey::Projects.cache_key());
    store.invalidate(&CatalogQueryKey::Featured.cache_key());
    store.invalidate(
      &CatalogQueryKey::ProjectDetail {
        id: project_id.to_string(),
      }
      .cache_key(),
    );
    // Category and tag listings are keyed by filter value and age out
    // through the freshness window instead.

    Ok(())
  }
}

fn decode<T: DeserializeOwned>(docs: &[Document]) -> Result<Vec<T>, CatalogError> {
  docs
    .iter()
    .map(|doc| {
      doc.deserialize_into().map_err(|source| CatalogError::Decode {
        id: doc.id.clone(),
        source,
      })
    })
    .collect()
}

/// Reorder `gallery` to match `new_order` by url. `None` unless `new_order`
/// is a permutation of the gallery urls.
fn reorder_by_url(gallery: &[GalleryImage], new_order: &[String]) -> Option<Vec<GalleryImage>> {
  if gallery.len() != new_order.len() {
    return None;
  }

  let mut remaining: Vec<&GalleryImage> = gallery.iter().collect();
  let mut reordered = Vec::with_capacity(gallery.len());
  for url in new_order {
    let index = remaining.iter().position(|image| &image.url == url)?;
    reordered.push(remaining.swap_remove(index).clone());
  }

  Some(reordered)
}
