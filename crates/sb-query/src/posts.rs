//! Post feed reads.

use crate::{check_limit, FeedQueries, DEFAULT_POST_LIMIT};
use sb_core::error::Result;
use sb_core::models::{fields, Post, Source};
use sb_core::query::{Cursor, Direction, FilterOp, Page, Query};
use sb_core::traits::FromDocument;

/// Options for [`FeedQueries::get_recent_posts`].
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// Exact source match
    pub source: Option<Source>,
    /// Membership test against `category_names`
    pub category: Option<String>,
    /// Case-insensitive substring, applied after the page is fetched
    pub search_query: Option<String>,
    pub limit: usize,
    pub cursor: Option<Cursor>,
    /// When false only posts with `is_relevant == true` are returned
    pub include_unprocessed: bool,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            source: None,
            category: None,
            search_query: None,
            limit: DEFAULT_POST_LIMIT,
            cursor: None,
            include_unprocessed: false,
        }
    }
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_query = Some(text.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn include_unprocessed(mut self, include: bool) -> Self {
        self.include_unprocessed = include;
        self
    }

    /// Builds the store query: equality and membership filters, then the
    /// mandatory `collected_at` ordering, then the cursor, then the limit.
    pub fn to_query(&self) -> Result<Query> {
        let limit = check_limit(self.limit)?;
        let mut query = Query::collection(Post::COLLECTION);

        if !self.include_unprocessed {
            query = query.filter(fields::IS_RELEVANT, FilterOp::Equal, true);
        }
        if let Some(source) = &self.source {
            query = query.filter(fields::SOURCE, FilterOp::Equal, source.as_str());
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(fields::CATEGORY_NAMES, FilterOp::ArrayContains, category);
        }

        query = query.order_by(fields::COLLECTED_AT, Direction::Descending);

        if let Some(cursor) = &self.cursor {
            query = query.start_after(cursor.clone());
        }
        Ok(query.limit(limit))
    }

    /// Lowercased search needle, or `None` when no search was requested.
    fn needle(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// True when `content_text`, `summary` or `author` contains the
/// lowercased `needle`.
pub fn matches_search(post: &Post, needle: &str) -> bool {
    post.content_text.to_lowercase().contains(needle)
        || post
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
        || post.author.to_lowercase().contains(needle)
}

impl FeedQueries {
    /// Fetches one page of recent posts, newest first.
    ///
    /// The search filter runs on the fetched page, so a searched page may
    /// hold fewer than `limit` posts even when more matches exist further
    /// down the feed. The returned cursor always points at the last
    /// *fetched* document so the next call continues the unfiltered scan.
    pub async fn get_recent_posts(&self, opts: &PostQuery) -> Result<Page<Post>> {
        let query = opts.to_query()?;
        let docs = self.fetch(&query).await?;

        let cursor = docs.last().and_then(|last| query.cursor_after(last));
        let mut posts: Vec<Post> = docs.iter().map(Post::from_document).collect();

        if let Some(needle) = opts.needle() {
            let fetched = posts.len();
            posts.retain(|post| matches_search(post, &needle));
            tracing::debug!(fetched, kept = posts.len(), "applied client-side search");
        }

        Ok(Page::new(posts, cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::error::AppError;
    use sb_core::query::Filter;
    use sb_core::traits::MockDocumentStore;
    use sb_core::value::{Document, FieldValue};
    use std::sync::Arc;

    fn post_with(author: &str, text: &str, summary: Option<&str>) -> Post {
        Post {
            author: author.into(),
            content_text: text.into(),
            summary: summary.map(Into::into),
            ..Post::default()
        }
    }

    #[test]
    fn test_default_query_restricts_to_relevant_posts() {
        let query = PostQuery::new().to_query().unwrap();
        assert_eq!(query.collection_name(), "posts");
        assert_eq!(
            query.filters(),
            &[Filter {
                field: "is_relevant".into(),
                op: FilterOp::Equal,
                value: FieldValue::Boolean(true),
            }]
        );
        let order = query.ordering().unwrap();
        assert_eq!(order.field, "collected_at");
        assert_eq!(order.direction, Direction::Descending);
        assert_eq!(query.max_results(), Some(50));
    }

    #[test]
    fn test_all_filters_in_constraint_order() {
        let query = PostQuery::new()
            .source(Source::Threads)
            .category("AI")
            .include_unprocessed(true)
            .limit(10)
            .to_query()
            .unwrap();

        let fields: Vec<_> = query.filters().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["source", "category_names"]);
        assert_eq!(query.filters()[1].op, FilterOp::ArrayContains);
        assert_eq!(query.max_results(), Some(10));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = PostQuery::new().limit(0).to_query().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_search_matches_any_text_field_case_insensitively() {
        assert!(matches_search(&post_with("OpenAI", "", None), "openai"));
        assert!(matches_search(&post_with("x", "New GPU from NVIDIA", None), "nvidia"));
        assert!(matches_search(&post_with("x", "", Some("Rust release")), "rust"));
        assert!(!matches_search(&post_with("x", "nothing", Some("here")), "rust"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockDocumentStore::new();
        store
            .expect_run_query()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("PERMISSION_DENIED")));

        let queries = FeedQueries::new(Arc::new(store));
        let err = queries.get_recent_posts(&PostQuery::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }

    #[tokio::test]
    async fn test_empty_page_has_no_cursor() {
        let mut store = MockDocumentStore::new();
        store.expect_run_query().returning(|_| Ok(Vec::new()));

        let queries = FeedQueries::new(Arc::new(store));
        let page = queries.get_recent_posts(&PostQuery::new()).await.unwrap();
        assert!(page.is_empty());
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_cursor_tracks_last_fetched_document_even_when_searched_out() {
        let mut store = MockDocumentStore::new();
        store.expect_run_query().returning(|_| {
            Ok(vec![
                Document::new("p2").with("author", "rust team").with("collected_at", FieldValue::Integer(2)),
                Document::new("p1").with("author", "someone").with("collected_at", FieldValue::Integer(1)),
            ])
        });

        let queries = FeedQueries::new(Arc::new(store));
        let page = queries
            .get_recent_posts(&PostQuery::new().search("RUST"))
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.items[0].id, "p2");
        assert_eq!(page.cursor.unwrap().document_id(), "p1");
    }

    #[tokio::test]
    async fn test_zero_limit_never_reaches_the_store() {
        let mut store = MockDocumentStore::new();
        store.expect_run_query().never();

        let queries = FeedQueries::new(Arc::new(store));
        let result = queries.get_recent_posts(&PostQuery::new().limit(0)).await;
        assert!(result.is_err());
    }
}
