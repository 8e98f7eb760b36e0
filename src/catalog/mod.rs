//! Portfolio domain: content types, cache keys, and the typed catalog
//! service built on the fetch layer.

mod import;
mod keys;
mod service;
mod types;

pub use import::{parse_gallery_csv, read_gallery_csv, ImportError};
pub use keys::CatalogQueryKey;
pub use service::{CatalogError, CatalogService};
pub use types::{GalleryImage, Project, Tag};
