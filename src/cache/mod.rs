//! Caching and fetch orchestration.
//!
//! [`CacheStore`] keeps the last result per query key with a freshness
//! window. [`QueryExecutor`] resolves queries cache-first under a request
//! deadline, degrading to stale data and retrying once when nothing is
//! cached. [`Scope`] ties in-flight work to the lifetime of its owner.

mod executor;
mod scope;
mod store;

pub use executor::{DataSource, FetchOutcome, QueryExecutor};
pub use scope::{Scope, ScopeHandle};
pub use store::{CacheEntry, CacheStore};
