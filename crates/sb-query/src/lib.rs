//! # sb-query
//!
//! The read side of the briefing feed. Each operation translates structured
//! options into one filtered, ordered, paginated [`Query`], executes it
//! against the injected [`DocumentStore`] and decodes the documents.
//!
//! No retry, backoff or timeout happens here: a store failure is returned
//! to the caller as [`AppError::Store`] on the first attempt.

pub mod briefings;
pub mod catalog;
pub mod posts;
pub mod stats;

pub use posts::PostQuery;

use sb_core::error::{AppError, Result};
use sb_core::query::Query;
use sb_core::traits::{DocumentStore, FromDocument};
use sb_core::value::Document;
use std::sync::Arc;

pub const DEFAULT_POST_LIMIT: usize = 50;
pub const DEFAULT_BRIEFING_LIMIT: usize = 20;
pub const DEFAULT_RUN_LIMIT: usize = 10;

/// Entry point for every feed read. Cheap to clone; clones share the
/// underlying store handle.
#[derive(Clone)]
pub struct FeedQueries {
    store: Arc<dyn DocumentStore>,
}

impl FeedQueries {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Runs `query` and returns the raw documents in scan order.
    async fn fetch(&self, query: &Query) -> Result<Vec<Document>> {
        tracing::debug!(
            collection = query.collection_name(),
            filters = query.filters().len(),
            limit = ?query.max_results(),
            paginated = query.cursor().is_some(),
            "running store query"
        );
        let docs = self.store.run_query(query).await?;
        tracing::debug!(collection = query.collection_name(), fetched = docs.len(), "store query finished");
        Ok(docs)
    }

    async fn fetch_all<T: FromDocument>(&self, query: &Query) -> Result<Vec<T>> {
        let docs = self.fetch(query).await?;
        Ok(docs.iter().map(T::from_document).collect())
    }

    async fn fetch_one<T: FromDocument>(&self, id: &str) -> Result<Option<T>> {
        if id.is_empty() {
            return Ok(None);
        }
        let doc = self.store.get_document(T::COLLECTION, id).await?;
        Ok(doc.as_ref().map(T::from_document))
    }
}

/// Page sizes must be positive; the hosted store rejects a zero limit.
fn check_limit(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(AppError::ValidationError("limit must be at least 1".into()));
    }
    Ok(limit)
}
