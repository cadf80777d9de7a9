//! Shared fixtures: a memory store seeded with a small, deterministic feed.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use sb_core::value::Document;
use sb_query::FeedQueries;
use sb_store_memory::MemoryDocumentStore;
use std::sync::Arc;

pub const SOURCES: [&str; 3] = ["twitter", "threads", "linkedin"];

pub fn post(id: &str, source: &str, collected_at: DateTime<Utc>) -> Document {
    Document::new(id)
        .with("source", source)
        .with("author", format!("author_{id}"))
        .with("content_text", format!("content of {id}"))
        .with("is_relevant", true)
        .with("collected_at", collected_at)
}

/// `count` relevant posts, one per minute going back from `now`, cycling
/// through [`SOURCES`]. Post `i` has id `p{i:02}`.
pub fn seeded_store(count: usize, now: DateTime<Utc>) -> MemoryDocumentStore {
    let store = MemoryDocumentStore::new();
    for i in 0..count {
        let at = now - Duration::minutes(i as i64);
        let mut doc = post(&format!("p{i:02}"), SOURCES[i % SOURCES.len()], at);
        if i % 4 == 0 {
            doc = doc
                .with("summary", format!("GPU shortage update {i}"))
                .with("keywords", vec!["GPU", "supply"])
                .with("category_names", vec!["Semiconductor"])
                .with("importance_score", 0.82);
        }
        store.insert("posts", doc);
    }
    store
}

pub fn queries(store: MemoryDocumentStore) -> FeedQueries {
    FeedQueries::new(Arc::new(store))
}
