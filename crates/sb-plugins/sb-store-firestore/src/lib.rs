//! # sb-store-firestore Implementation
//!
//! `DocumentStore` backed by the Firestore REST API. Reads are
//! unauthenticated apart from the web API key, so what this store can see
//! is whatever the project's security rules expose publicly.

pub mod codec;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use codec::{documents_root, structured_query, RawDocument, RunQueryItem};
use reqwest::{Client, StatusCode, Url};
use sb_config::FirebaseConfig;
use sb_core::query::Query;
use sb_core::traits::DocumentStore;
use sb_core::value::Document;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreStore {
    client: Client,
    base_url: Url,
    project_id: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

impl FirestoreStore {
    pub fn new(config: FirebaseConfig) -> anyhow::Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: FirebaseConfig) -> anyhow::Result<Self> {
        if config.project_id.trim().is_empty() {
            bail!("firebase project_id is empty");
        }
        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base.trim_end_matches('/'))
            .with_context(|| format!("invalid Firestore base url: {base}"))?;
        if base_url.cannot_be_a_base() {
            bail!("Firestore base url cannot hold a path: {base}");
        }
        Ok(Self {
            client,
            base_url,
            project_id: config.project_id,
            api_key: config.api_key,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `{base}/projects/{p}/databases/(default)/documents/{segments...}`
    fn documents_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Firestore base url cannot hold a path"))?
            .pop_if_empty()
            .extend(documents_root(&self.project_id).split('/'))
            .extend(segments);
        url.query_pairs_mut().append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn failure(response: reqwest::Response, operation: &str) -> anyhow::Error {
        let status = response.status();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => format!("{} {}", body.error.status, body.error.message),
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        anyhow!("Firestore {operation} failed ({status}): {}", detail.trim())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn run_query(&self, query: &Query) -> anyhow::Result<Vec<Document>> {
        let mut url = self.documents_url(std::iter::empty())?;
        // `documents:runQuery` is a custom method on the parent resource.
        let path = format!("{}:runQuery", url.path());
        url.set_path(&path);

        let body = structured_query(query, &self.project_id);
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("runQuery on {} failed to send", query.collection_name()))?;
        if !response.status().is_success() {
            return Err(Self::failure(response, "runQuery").await);
        }

        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .context("failed to decode runQuery response")?;
        let docs: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document.map(RawDocument::into_document))
            .collect();
        tracing::debug!(
            collection = %query.collection_name(),
            returned = docs.len(),
            "firestore runQuery"
        );
        Ok(docs)
    }

    async fn get_document(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let url = self.documents_url([collection, id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("get {collection}/{id} failed to send"))?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(collection, id, "document not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure(response, "get").await);
        }
        let raw: RawDocument = response
            .json()
            .await
            .with_context(|| format!("failed to decode {collection}/{id}"))?;
        Ok(Some(raw.into_document()))
    }
}
