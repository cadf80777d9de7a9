//! # Core Traits (Ports)
//!
//! Any store plugin must implement these traits to back the query layer.

use crate::query::Query;
use crate::value::Document;
use async_trait::async_trait;

/// Read-only access to a remote (or in-process) document store.
///
/// Implementations must be safe for any number of concurrent outstanding
/// reads. They add no retry or timeout of their own; failures surface to
/// the caller as they happen.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Executes a filtered, ordered, paginated scan of one collection.
    async fn run_query(&self, query: &Query) -> anyhow::Result<Vec<Document>>;

    /// Point lookup. `Ok(None)` when the document does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;
}

/// Maps a stored document into a domain entity.
pub trait FromDocument: Sized {
    /// Collection the entity lives in.
    const COLLECTION: &'static str;

    fn from_document(doc: &Document) -> Self;
}
