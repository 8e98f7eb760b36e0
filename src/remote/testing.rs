//! Scripted in-memory document store for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::RemoteError;

use super::{Document, DocumentStore, QueryDescriptor};

/// One scripted reply for `get_docs`.
pub enum Reply {
  Docs(Vec<Document>),
  Fail,
  /// Never settles; exercises the timeout race.
  Hang,
}

/// A recorded `update_fields` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
  pub collection: String,
  pub id: String,
  pub fields: Map<String, Value>,
}

/// Scripted store: pops one reply per `get_docs` call, counts calls, and
/// records writes. Panics if called with an exhausted script so a test that
/// over-fetches fails loudly.
pub struct MockStore {
  replies: Mutex<VecDeque<Reply>>,
  calls: AtomicUsize,
  writes: Mutex<Vec<RecordedWrite>>,
  on_call: Mutex<Option<Box<dyn Fn(usize) + Send + Sync>>>,
}

impl MockStore {
  pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
    Arc::new(Self {
      replies: Mutex::new(replies.into_iter().collect()),
      calls: AtomicUsize::new(0),
      writes: Mutex::new(Vec::new()),
      on_call: Mutex::new(None),
    })
  }

  /// Number of `get_docs` calls so far.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Writes recorded so far, in order.
  pub fn writes(&self) -> Vec<RecordedWrite> {
    self.writes.lock().clone()
  }

  /// Run `hook` at the start of every `get_docs` call, with the 1-based
  /// call number. Used to tear a scope down at a precise point.
  pub fn set_on_call(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
    *self.on_call.lock() = Some(Box::new(hook));
  }
}

/// Build a document from a JSON object literal.
pub fn doc(id: &str, fields: Value) -> Document {
  match fields {
    Value::Object(map) => Document::new(id, map),
    _ => panic!("doc() expects a json object"),
  }
}

#[async_trait]
impl DocumentStore for MockStore {
  async fn get_docs(&self, _query: &QueryDescriptor) -> Result<Vec<Document>, RemoteError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(hook) = self.on_call.lock().as_ref() {
      hook(call);
    }

    let reply = self
      .replies
      .lock()
      .pop_front()
      .expect("mock store script exhausted");

    match reply {
      Reply::Docs(docs) => Ok(docs),
      Reply::Fail => Err(RemoteError::Status {
        status: 503,
        endpoint: "/test".to_string(),
      }),
      Reply::Hang => {
        futures::future::pending::<()>().await;
        unreachable!()
      }
    }
  }

  async fn update_fields(
    &self,
    collection: &str,
    id: &str,
    fields: Map<String, Value>,
  ) -> Result<(), RemoteError> {
    self.writes.lock().push(RecordedWrite {
      collection: collection.to_string(),
      id: id.to_string(),
      fields,
    });
    Ok(())
  }
}
