//! Portfolio content types.

use serde::{Deserialize, Serialize};

/// One image in a project's gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub caption: Option<String>,
}

/// A portfolio project: one produced video with its presentation assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub category: String,
  #[serde(default)]
  pub tags: Vec<String>,
  pub video_url: Option<String>,
  pub thumbnail_url: Option<String>,
  #[serde(default)]
  pub gallery: Vec<GalleryImage>,
  #[serde(default)]
  pub featured: bool,
  /// Position within the featured rail; lower comes first.
  pub featured_position: Option<u32>,
  pub client: Option<String>,
  pub year: Option<u16>,
  #[serde(default)]
  pub published: bool,
}

/// A content tag used for filtering the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub id: String,
  pub name: String,
  pub slug: String,
}
