//! Document-store trait and the REST client implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use crate::error::RemoteError;

use super::api_types::{ApiQuery, ApiQueryResponse, ApiUpdateRequest};
use super::types::{Document, QueryDescriptor};

/// Capability the fetch layer needs from a document database.
///
/// The executor treats this as opaque: it hands over a descriptor and gets
/// back document snapshots, without depending on any wire protocol.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Run the query and return the matching documents. Zero documents is a
  /// valid result, not an error.
  async fn get_docs(&self, query: &QueryDescriptor) -> Result<Vec<Document>, RemoteError>;

  /// Merge the given fields into one document. Write path, never cached.
  async fn update_fields(
    &self,
    collection: &str,
    id: &str,
    fields: Map<String, Value>,
  ) -> Result<(), RemoteError>;
}

/// REST client for the portfolio content API.
#[derive(Clone)]
pub struct HttpDocumentStore {
  http: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl HttpDocumentStore {
  /// Create a client for the API at `base_url`, optionally authenticated
  /// with a bearer token. Reads work anonymously; writes need the token.
  pub fn new(mut base_url: Url, token: Option<String>) -> Result<Self, RemoteError> {
    // Url::join replaces the last path segment unless the base ends in '/'.
    if !base_url.path().ends_with('/') {
      base_url.set_path(&format!("{}/", base_url.path()));
    }

    let http = reqwest::Client::builder().build()?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
    Ok(self.base_url.join(path)?)
  }

  fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
  async fn get_docs(&self, query: &QueryDescriptor) -> Result<Vec<Document>, RemoteError> {
    let url = self.endpoint(&format!(
      "v1/collections/{}/documents:query",
      query.collection
    ))?;
    let endpoint = url.path().to_string();

    let response = self
      .authorized(self.http.post(url))
      .json(&ApiQuery::from_descriptor(query))
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(RemoteError::Status {
        status: response.status().as_u16(),
        endpoint,
      });
    }

    let body = response.bytes().await?;
    let payload: ApiQueryResponse = serde_json::from_slice(&body)?;

    Ok(payload.documents.into_iter().map(Document::from).collect())
  }

  async fn update_fields(
    &self,
    collection: &str,
    id: &str,
    fields: Map<String, Value>,
  ) -> Result<(), RemoteError> {
    let url = self.endpoint(&format!("v1/collections/{}/documents/{}", collection, id))?;
    let endpoint = url.path().to_string();

    let response = self
      .authorized(self.http.patch(url))
      .json(&ApiUpdateRequest { fields })
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(RemoteError::Status {
        status: response.status().as_u16(),
        endpoint,
      });
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_url_gets_a_trailing_slash() {
    let store =
      HttpDocumentStore::new(Url::parse("https://content.example.com/api").unwrap(), None).unwrap();

    let url = store.endpoint("v1/collections/projects/documents:query").unwrap();
    assert_eq!(
      url.as_str(),
      "https://content.example.com/api/v1/collections/projects/documents:query"
    );
  }
}
