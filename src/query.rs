//! Poll-based view-state for UI consumers.
//!
//! A [`UiQuery`] owns the loading/data/error state for one query the way a
//! rendering component would hold it: start a fetch, poll every tick, render
//! from the current state. Results arrive over a channel so polling never
//! blocks, and dropping the query discards any late result.
//!
//! # Example
//!
//! ```ignore
//! let mut query: UiQuery<Project, _> = UiQuery::new(
//!     executor.clone(),
//!     QueryDescriptor::collection("projects"),
//!     QueryOptions::default(),
//! );
//!
//! query.fetch();
//!
//! // In the render loop tick
//! if query.poll() {
//!     // State changed, re-render
//! }
//!
//! if query.is_loading() {
//!     render_spinner();
//! } else if let Some(error) = query.error() {
//!     render_error(error, query.data());
//! } else {
//!     render_projects(query.data());
//! }
//! ```

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::{DataSource, FetchOutcome, QueryExecutor, ScopeHandle};
use crate::error::{FetchError, RemoteError};
use crate::remote::{Document, DocumentStore, QueryDescriptor};

/// Options supplied by the consumer alongside the query itself.
#[derive(Debug, Clone)]
pub struct QueryOptions {
  /// Explicit cache key; defaults to the descriptor's own key.
  pub cache_key: Option<String>,
  /// When false, no fetch is ever issued. Used to gate queries on external
  /// conditions such as "only when authenticated".
  pub enabled: bool,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      cache_key: None,
      enabled: true,
    }
  }
}

/// View-state of a query, re-read by the consumer on every transition.
///
/// `data` and `error` can be populated together: a stale-served result
/// carries the rows alongside the non-fatal error that forced the fallback.
#[derive(Debug)]
pub struct FetchResult<T> {
  pub data: Vec<T>,
  pub loading: bool,
  pub error: Option<FetchError>,
  /// Provenance of `data`, once any fetch has completed.
  pub source: Option<DataSource>,
}

impl<T> Default for FetchResult<T> {
  fn default() -> Self {
    Self {
      data: Vec::new(),
      loading: false,
      error: None,
      source: None,
    }
  }
}

enum Message<T> {
  Resolved {
    data: Vec<T>,
    source: DataSource,
    degraded: Option<FetchError>,
  },
  Failed(FetchError),
}

/// A query bound to one consumer's lifetime.
///
/// The in-flight work runs on the runtime; `poll` applies whatever has
/// settled since the last tick. Dropping the `UiQuery` closes its scope, so
/// a result that lands afterwards is discarded instead of applied.
pub struct UiQuery<T, S> {
  executor: Arc<QueryExecutor<S>>,
  descriptor: QueryDescriptor,
  options: QueryOptions,
  result: FetchResult<T>,
  receiver: Option<mpsc::UnboundedReceiver<Message<T>>>,
  scope: Option<ScopeHandle>,
}

impl<T, S> UiQuery<T, S>
where
  T: DeserializeOwned + Send + 'static,
  S: DocumentStore + 'static,
{
  pub fn new(
    executor: Arc<QueryExecutor<S>>,
    descriptor: QueryDescriptor,
    options: QueryOptions,
  ) -> Self {
    Self {
      executor,
      descriptor,
      options,
      result: FetchResult::default(),
      receiver: None,
      scope: None,
    }
  }

  /// Current view-state.
  pub fn result(&self) -> &FetchResult<T> {
    &self.result
  }

  /// Rows from the last completed fetch (possibly stale-served).
  pub fn data(&self) -> &[T] {
    &self.result.data
  }

  pub fn is_loading(&self) -> bool {
    self.result.loading
  }

  /// Fatal error, or the non-fatal one behind a degraded result.
  pub fn error(&self) -> Option<&FetchError> {
    self.result.error.as_ref()
  }

  /// Gate or un-gate future fetches. Does not cancel in-flight work.
  pub fn set_enabled(&mut self, enabled: bool) {
    self.options.enabled = enabled;
  }

  /// Start fetching unless disabled or already loading.
  pub fn fetch(&mut self) {
    if !self.options.enabled || self.result.loading {
      return;
    }
    self.start_fetch();
  }

  /// Force a new fetch, discarding any in-flight one.
  pub fn refetch(&mut self) {
    if !self.options.enabled {
      return;
    }
    // Closing the old scope makes the executor drop the previous result
    // instead of writing it back under our feet.
    self.scope = None;
    self.receiver = None;
    self.start_fetch();
  }

  /// Apply a settled result, if any. Returns true when the state changed;
  /// call this from the consumer's tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Message::Resolved {
        data,
        source,
        degraded,
      }) => {
        self.result.data = data;
        self.result.loading = false;
        self.result.error = degraded;
        self.result.source = Some(source);
        self.receiver = None;
        self.scope = None;
        true
      }
      Ok(Message::Failed(error)) => {
        self.result.data = Vec::new();
        self.result.loading = false;
        self.result.error = Some(error);
        self.receiver = None;
        self.scope = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending; the fetch was abandoned.
        self.result.loading = false;
        self.receiver = None;
        self.scope = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ScopeHandle::new();
    let scope = handle.scope();
    self.receiver = Some(rx);
    self.scope = Some(handle);
    self.result.loading = true;

    let executor = Arc::clone(&self.executor);
    let mut descriptor = self.descriptor.clone();
    if let Some(key) = &self.options.cache_key {
      descriptor = descriptor.with_cache_key(key.clone());
    }

    tokio::spawn(async move {
      let message = match executor.fetch(&descriptor, &scope).await {
        Ok(outcome) => {
          let FetchOutcome {
            docs,
            source,
            degraded,
            ..
          } = outcome;
          match decode_rows::<T>(&docs) {
            Ok(data) => Message::Resolved {
              data,
              source,
              degraded,
            },
            Err(error) => Message::Failed(FetchError::Remote(RemoteError::Decode(error))),
          }
        }
        // Our owner is gone; there is nobody left to tell.
        Err(FetchError::ScopeClosed) => return,
        Err(error) => Message::Failed(error),
      };

      // Send fails only if the consumer was dropped; ignore.
      let _ = tx.send(message);
    });
  }
}

fn decode_rows<T: DeserializeOwned>(docs: &[Document]) -> Result<Vec<T>, serde_json::Error> {
  docs.iter().map(Document::deserialize_into).collect()
}

impl<T: std::fmt::Debug, S> std::fmt::Debug for UiQuery<T, S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("UiQuery")
      .field("descriptor", &self.descriptor)
      .field("result", &self.result)
      .finish_non_exhaustive()
  }
}
