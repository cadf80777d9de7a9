//! sns-briefing/crates/sb-core/src/lib.rs
//!
//! The domain model and store interface definitions for the briefing feed.

pub mod models;
pub mod query;
pub mod traits;
pub mod value;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use query::*;
pub use traits::*;
pub use value::*;
pub use error::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_post_decoding_from_document() {
        let collected = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        let doc = Document::new("1790000000000000000")
            .with("source", "twitter")
            .with("author", "rustlang")
            .with("content_text", "Rust 1.80 is out")
            .with("keywords", vec!["rust", "release"])
            .with("category_names", vec!["AI"])
            .with("importance_score", 0.82)
            .with("is_relevant", true)
            .with("collected_at", collected)
            .with("engagement_likes", 12_i64);

        let post = Post::from_document(&doc);
        assert_eq!(post.id, "1790000000000000000");
        assert_eq!(post.source, Some(Source::Twitter));
        assert_eq!(post.keywords, vec!["rust", "release"]);
        assert_eq!(post.importance_score, Some(0.82));
        assert_eq!(post.is_relevant, Some(true));
        assert_eq!(post.collected_at, Some(collected));
        assert_eq!(post.engagement.likes, 12);
        assert!(post.summary.is_none());
        assert!(post.url.is_none());
    }

    #[test]
    fn test_empty_document_degrades_to_defaults() {
        let post = Post::from_document(&Document::new("x"));
        assert_eq!(post.author, "");
        assert!(post.source.is_none());
        assert!(post.keywords.is_empty());

        let briefing = Briefing::from_document(&Document::new("b"));
        assert_eq!(briefing.briefing_type, "daily");
        assert!(briefing.items.is_empty());

        let category = Category::from_document(&Document::new("AI"));
        assert_eq!(category.name, "AI");
        assert_eq!(category.name_ko, "AI");
        assert_eq!(category.color, "#888888");

        let run = CollectionRun::from_document(&Document::new("r"));
        assert_eq!(run.status, RunStatus::Running);
    }

    #[test]
    fn test_briefing_items_decoding() {
        let mut item = std::collections::BTreeMap::new();
        item.insert("headline".to_string(), FieldValue::from("GPU supply"));
        item.insert("sort_order".to_string(), FieldValue::Integer(2));
        let doc = Document::new("b1")
            .with("title", "Daily")
            .with("items", FieldValue::Array(vec![FieldValue::Map(item), FieldValue::from("junk")]));

        let briefing = Briefing::from_document(&doc);
        assert_eq!(briefing.items.len(), 1);
        assert_eq!(briefing.items[0].headline, "GPU supply");
        assert_eq!(briefing.items[0].sort_order, 2);
        assert_eq!(briefing.items[0].importance_score, 0.5);
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(Source::parse("linkedin"), Some(Source::Linkedin));
        assert_eq!(Source::parse("  "), None);
        assert_eq!(Source::parse("mastodon"), Some(Source::Other("mastodon".into())));
        assert_eq!(Source::Dcinside.to_string(), "dcinside");
    }
}
