//! Trailing-window aggregation over posts.
//!
//! The count is a full scan of the window with no pagination. That is fine
//! for the volume a handful of collectors produce in a day; a larger feed
//! would need a counter maintained at write time.

use crate::FeedQueries;
use chrono::{DateTime, Duration, Utc};
use sb_core::error::Result;
use sb_core::models::{fields, Post};
use sb_core::query::{Direction, FilterOp, Query};
use sb_core::traits::FromDocument;
use std::collections::BTreeMap;

/// Bucket for posts that carry no source.
pub const UNKNOWN_SOURCE: &str = "unknown";

impl FeedQueries {
    /// Posts collected in the last 24 hours, counted per source.
    pub async fn get_source_counts_24h(&self) -> Result<BTreeMap<String, u64>> {
        self.get_source_counts_since(Utc::now() - Duration::hours(24)).await
    }

    /// Posts with `collected_at >= since`, counted per source.
    pub async fn get_source_counts_since(&self, since: DateTime<Utc>) -> Result<BTreeMap<String, u64>> {
        let query = Query::collection(Post::COLLECTION)
            .filter(fields::COLLECTED_AT, FilterOp::GreaterOrEqual, since)
            .order_by(fields::COLLECTED_AT, Direction::Descending);
        let docs = self.fetch(&query).await?;

        let mut counts = BTreeMap::new();
        for doc in &docs {
            let source = Post::from_document(doc)
                .source
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
            *counts.entry(source).or_insert(0) += 1;
        }
        tracing::debug!(window_posts = docs.len(), sources = counts.len(), "counted posts by source");
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::value::Document;
    use sb_store_memory::MemoryDocumentStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_counts_group_by_source_within_window() {
        let now = Utc::now();
        let store = MemoryDocumentStore::new();
        let seed = [
            ("t1", Some("twitter"), 1),
            ("t2", Some("twitter"), 5),
            ("th", Some("threads"), 23),
            ("blank", Some(""), 2),
            ("none", None, 3),
            ("old", Some("twitter"), 30),
        ];
        for (id, source, hours_ago) in seed {
            let mut doc = Document::new(id).with("collected_at", now - Duration::hours(hours_ago));
            if let Some(source) = source {
                doc = doc.with("source", source);
            }
            store.insert("posts", doc);
        }
        let queries = FeedQueries::new(Arc::new(store));

        let counts = queries.get_source_counts_24h().await.unwrap();
        assert_eq!(counts.get("twitter"), Some(&2));
        assert_eq!(counts.get("threads"), Some(&1));
        assert_eq!(counts.get(UNKNOWN_SOURCE), Some(&2));
        assert_eq!(counts.values().sum::<u64>(), 5);
    }

    #[tokio::test]
    async fn test_counts_include_unprocessed_posts() {
        let since = Utc::now() - Duration::hours(1);
        let store = MemoryDocumentStore::new();
        store.insert(
            "posts",
            Document::new("p")
                .with("source", "linkedin")
                .with("is_relevant", false)
                .with("collected_at", Utc::now()),
        );
        let queries = FeedQueries::new(Arc::new(store));

        let counts = queries.get_source_counts_since(since).await.unwrap();
        assert_eq!(counts.get("linkedin"), Some(&1));
    }
}
