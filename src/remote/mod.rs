//! Document-store abstraction and the REST client.
//!
//! [`DocumentStore`] is the seam between the fetch layer and whatever
//! backend actually holds the content; [`HttpDocumentStore`] implements it
//! against the studio's REST content API.

mod api_types;
mod client;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{DocumentStore, HttpDocumentStore};
pub use types::{Constraint, Direction, Document, QueryDescriptor};
