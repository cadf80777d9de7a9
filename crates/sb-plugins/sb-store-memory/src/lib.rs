//! # sb-store-memory Implementation
//!
//! An in-process `DocumentStore` that evaluates queries locally with the
//! same semantics as the hosted store: filters, a single ordering with the
//! document id as tiebreaker, start-after cursors and limits.
//! Used by tests and for rendering from an exported JSON snapshot.

use async_trait::async_trait;
use dashmap::DashMap;
use sb_core::query::Query;
use sb_core::traits::DocumentStore;
use sb_core::value::Document;
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Default)]
pub struct MemoryDocumentStore {
    /// collection name -> (document id -> document)
    collections: DashMap<String, BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc);
    }

    pub fn extend(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        let mut entry = self.collections.entry(collection.to_string()).or_default();
        for doc in docs {
            entry.insert(doc.id.clone(), doc);
        }
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(|c| c.is_empty())
    }

    /// Loads a snapshot shaped as `{ "<collection>": [Document, ...], ... }`.
    pub fn from_snapshot<R: Read>(reader: R) -> anyhow::Result<Self> {
        let snapshot: BTreeMap<String, Vec<Document>> = serde_json::from_reader(reader)?;
        let store = Self::new();
        for (collection, docs) in snapshot {
            tracing::debug!(collection = %collection, count = docs.len(), "loading snapshot collection");
            store.extend(&collection, docs);
        }
        Ok(store)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn run_query(&self, query: &Query) -> anyhow::Result<Vec<Document>> {
        let mut docs: Vec<Document> = match self.collections.get(query.collection_name()) {
            Some(collection) => collection
                .values()
                .filter(|doc| query.filters().iter().all(|f| f.matches(doc)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        match query.ordering() {
            Some(order) => {
                // Documents lacking the order field never appear in an ordered scan.
                docs.retain(|doc| doc.get(&order.field).is_some());
                docs.sort_by(|a, b| order.compare(a, b));
                if let Some(cursor) = query.cursor() {
                    docs.retain(|doc| cursor.admits(doc, order));
                }
            }
            None => {
                // BTreeMap iteration already yields id order.
                if let Some(cursor) = query.cursor() {
                    docs.retain(|doc| doc.id.as_str() > cursor.document_id());
                }
            }
        }

        if let Some(limit) = query.max_results() {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn get_document(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(id).cloned()))
    }
}
