//! Fetch orchestration: cache-first reads with a request deadline, stale
//! fallback, and a single retry.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::remote::{Document, DocumentStore, QueryDescriptor};

use super::scope::Scope;
use super::store::CacheStore;

/// Where the documents in a [`FetchOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  /// Fresh data from the remote store.
  Network,
  /// Cache hit inside the freshness window; no remote call was made.
  CacheFresh,
  /// Stale cached data served because the remote call failed.
  CacheStale,
}

/// Result of a fetch: documents plus their provenance.
#[derive(Debug)]
pub struct FetchOutcome {
  pub docs: Vec<Document>,
  pub source: DataSource,
  /// When the documents were originally fetched, for cache-served outcomes.
  pub fetched_at: Option<DateTime<Utc>>,
  /// The error that forced the fallback, when `source` is `CacheStale`.
  /// Degraded outcomes still count as success.
  pub degraded: Option<FetchError>,
}

/// Resolves queries against the remote store, preferring cached results and
/// degrading to stale data when the remote is slow or down.
///
/// One instance is shared by all consumers of a session; the only shared
/// mutation is the whole-entry overwrite in [`CacheStore`], so concurrent
/// fetches for the same key are safe. They are not de-duplicated: two
/// concurrent misses both hit the remote and the last write wins.
pub struct QueryExecutor<S> {
  remote: Arc<S>,
  store: Arc<CacheStore>,
  request_timeout: Duration,
  retry_delay: Duration,
}

impl<S: DocumentStore> QueryExecutor<S> {
  /// Create an executor with the default 30 second request deadline and
  /// 2 second retry delay.
  pub fn new(remote: Arc<S>, store: Arc<CacheStore>) -> Self {
    Self {
      remote,
      store,
      request_timeout: Duration::from_secs(30),
      retry_delay: Duration::from_secs(2),
    }
  }

  /// Override the per-attempt request deadline.
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }

  /// Override the delay before the single retry.
  pub fn with_retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  /// The shared cache store. Write paths use this to invalidate keys.
  pub fn store(&self) -> &Arc<CacheStore> {
    &self.store
  }

  /// The underlying document store. Write paths go straight through it.
  pub fn remote(&self) -> &Arc<S> {
    &self.remote
  }

  /// Resolve `query` to documents.
  ///
  /// A fresh cache entry is returned without touching the network. On a
  /// miss or a stale entry the remote call runs under the request deadline;
  /// a failure falls back to whatever cached entry exists, and only when
  /// there is none does the executor wait out the retry delay and try once
  /// more. The retry is a straight-line second attempt, so a single
  /// invocation never issues more than two remote calls.
  ///
  /// The scope is consulted after every suspension point; once the owner is
  /// gone the result is discarded and nothing is written back.
  pub async fn fetch(
    &self,
    query: &QueryDescriptor,
    scope: &Scope,
  ) -> Result<FetchOutcome, FetchError> {
    let key = query.effective_cache_key().to_string();

    if let Some(entry) = self.store.get(&key) {
      if self.store.is_fresh(&entry) {
        return Ok(FetchOutcome {
          docs: entry.docs,
          source: DataSource::CacheFresh,
          fetched_at: Some(entry.fetched_at),
          degraded: None,
        });
      }
    }

    match self.attempt(query, scope).await {
      Ok(outcome) => Ok(outcome),
      Err(FetchError::ScopeClosed) => Err(FetchError::ScopeClosed),
      Err(error) => {
        // Any cached entry, stale included, beats waiting on a retry.
        if let Some(entry) = self.store.get(&key) {
          warn!(key = %key, error = %error, "remote query failed, serving stale cache");
          return Ok(FetchOutcome {
            docs: entry.docs,
            source: DataSource::CacheStale,
            fetched_at: Some(entry.fetched_at),
            degraded: Some(error),
          });
        }

        debug!(key = %key, delay = ?self.retry_delay, "remote query failed with nothing cached, retrying once");
        tokio::time::sleep(self.retry_delay).await;
        if !scope.is_live() {
          return Err(FetchError::ScopeClosed);
        }

        self.attempt(query, scope).await
      }
    }
  }

  /// One remote attempt under the request deadline, written back to the
  /// cache on success. The deadline drops the in-flight call when it fires,
  /// so a timed-out attempt can never write back later.
  async fn attempt(
    &self,
    query: &QueryDescriptor,
    scope: &Scope,
  ) -> Result<FetchOutcome, FetchError> {
    let result = tokio::time::timeout(self.request_timeout, self.remote.get_docs(query)).await;

    if !scope.is_live() {
      return Err(FetchError::ScopeClosed);
    }

    let docs = match result {
      Ok(Ok(docs)) => docs,
      Ok(Err(remote)) => return Err(FetchError::Remote(remote)),
      Err(_elapsed) => return Err(FetchError::Timeout(self.request_timeout)),
    };

    self.store.set(query.effective_cache_key(), docs.clone());

    Ok(FetchOutcome {
      docs,
      source: DataSource::Network,
      fetched_at: None,
      degraded: None,
    })
  }
}
