//! Error taxonomy for the fetch layer.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the remote document-store client.
#[derive(Debug, Error)]
pub enum RemoteError {
  /// Transport-level failure (connection, TLS, body read).
  #[error("http transport error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("unexpected status {status} from {endpoint}")]
  Status { status: u16, endpoint: String },

  /// The response body could not be decoded.
  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// An endpoint path could not be joined onto the base URL.
  #[error("invalid endpoint url: {0}")]
  Url(#[from] url::ParseError),
}

/// Errors surfaced by a fetch.
///
/// An empty result set is a successful fetch, never an error. Degraded
/// results (stale cache served after a remote failure) are also successes;
/// the triggering error rides along on the outcome instead.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The remote call did not settle within the request deadline.
  #[error("remote query timed out after {0:?}")]
  Timeout(Duration),

  /// The underlying document-store call failed.
  #[error("remote query failed: {0}")]
  Remote(#[source] RemoteError),

  /// The owning scope was torn down while the fetch was in flight.
  #[error("owning scope closed before the fetch settled")]
  ScopeClosed,
}
