//! # Domain Models
//!
//! Read-only views of the records an external ingestion and summarization
//! pipeline writes into the document store. Decoding is lenient: a missing
//! or mistyped field becomes its default instead of an error.

use crate::traits::FromDocument;
use crate::value::{Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field names shared by the query layer and store fixtures.
pub mod fields {
    pub const IS_RELEVANT: &str = "is_relevant";
    pub const SOURCE: &str = "source";
    pub const CATEGORY_NAMES: &str = "category_names";
    pub const COLLECTED_AT: &str = "collected_at";
    pub const GENERATED_AT: &str = "generated_at";
    pub const STARTED_AT: &str = "started_at";
    pub const COMPLETED_AT: &str = "completed_at";
    pub const STATUS: &str = "status";
}

/// The social platform a post was collected from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Twitter,
    Threads,
    Linkedin,
    Dcinside,
    /// Any platform added upstream after this crate was written
    Other(String),
}

impl Source {
    /// Platforms with a collector upstream.
    pub const KNOWN: [Source; 4] = [Self::Twitter, Self::Threads, Self::Linkedin, Self::Dcinside];

    /// Parses a stored source name. Blank names carry no source at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return None;
        }
        Some(match name {
            "twitter" => Self::Twitter,
            "threads" => Self::Threads,
            "linkedin" => Self::Linkedin,
            "dcinside" => Self::Dcinside,
            other => Self::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Twitter => "twitter",
            Self::Threads => "threads",
            Self::Linkedin => "linkedin",
            Self::Dcinside => "dcinside",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Source {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or(Self::Other(raw))
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_str().to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub reposts: u64,
    pub comments: u64,
    pub views: u64,
}

/// A collected social media post, possibly enriched by the AI pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub external_id: String,
    pub source: Option<Source>,
    pub author: String,
    pub author_url: Option<String>,
    pub content_text: String,
    /// AI summary; absent until the pipeline processed the post
    pub summary: Option<String>,
    pub keywords: Vec<String>,
    pub category_names: Vec<String>,
    /// Relevance weight in `[0, 1]`
    pub importance_score: Option<f64>,
    pub language: Option<String>,
    pub is_relevant: Option<bool>,
    pub url: Option<String>,
    pub media_urls: Vec<String>,
    pub engagement: Engagement,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: Option<DateTime<Utc>>,
}

impl FromDocument for Post {
    const COLLECTION: &'static str = "posts";

    fn from_document(doc: &Document) -> Self {
        let f = doc.fields();
        Self {
            id: doc.id.clone(),
            external_id: f.string("external_id"),
            source: f.get(fields::SOURCE).and_then(|v| v.as_str()).and_then(Source::parse),
            author: f.string("author"),
            author_url: f.non_empty("author_url"),
            content_text: f.string("content_text"),
            summary: f.non_empty("summary"),
            keywords: f.strings("keywords"),
            category_names: f.strings(fields::CATEGORY_NAMES),
            importance_score: f.f64("importance_score"),
            language: f.non_empty("language"),
            is_relevant: f.bool(fields::IS_RELEVANT),
            url: f.non_empty("url"),
            media_urls: f.strings("media_urls"),
            engagement: Engagement {
                likes: f.count("engagement_likes"),
                reposts: f.count("engagement_reposts"),
                comments: f.count("engagement_comments"),
                views: f.count("engagement_views"),
            },
            published_at: f.timestamp("published_at"),
            collected_at: f.timestamp(fields::COLLECTED_AT),
        }
    }
}

/// One consolidated topic inside a briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingItem {
    pub headline: String,
    pub body: String,
    pub importance_score: f64,
    pub category_name: Option<String>,
    pub sort_order: u64,
    pub source_count: u64,
    pub sources_summary: String,
}

impl BriefingItem {
    fn from_fields(f: Fields<'_>) -> Self {
        Self {
            headline: f.string("headline"),
            body: f.string("body"),
            importance_score: f.f64("importance_score").unwrap_or(0.5),
            category_name: f.non_empty("category_name"),
            sort_order: f.count("sort_order"),
            source_count: f.count("source_count"),
            sources_summary: f.string("sources_summary"),
        }
    }
}

/// A periodic AI-generated report over a window of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub id: String,
    pub title: String,
    pub briefing_type: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub total_posts_analyzed: u64,
    pub total_items: u64,
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub email_sent: bool,
    pub items: Vec<BriefingItem>,
}

impl FromDocument for Briefing {
    const COLLECTION: &'static str = "briefings";

    fn from_document(doc: &Document) -> Self {
        let f = doc.fields();
        Self {
            id: doc.id.clone(),
            title: f.string("title"),
            briefing_type: f.non_empty("briefing_type").unwrap_or_else(|| "daily".to_string()),
            generated_at: f.timestamp(fields::GENERATED_AT),
            period_start: f.timestamp("period_start"),
            period_end: f.timestamp("period_end"),
            total_posts_analyzed: f.count("total_posts_analyzed"),
            total_items: f.count("total_items"),
            content_html: f.non_empty("content_html"),
            content_text: f.non_empty("content_text"),
            email_sent: f.bool("email_sent").unwrap_or(false),
            items: f.maps("items").into_iter().map(BriefingItem::from_fields).collect(),
        }
    }
}

/// Topic reference entry. Documents are keyed by the category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Korean display name
    pub name_ko: String,
    pub color: String,
}

impl FromDocument for Category {
    const COLLECTION: &'static str = "categories";

    fn from_document(doc: &Document) -> Self {
        let f = doc.fields();
        Self {
            id: doc.id.clone(),
            name: f.non_empty("name").unwrap_or_else(|| doc.id.clone()),
            name_ko: f.non_empty("name_ko").unwrap_or_else(|| doc.id.clone()),
            color: f.non_empty("color").unwrap_or_else(|| "#888888".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
    Partial,
}

impl RunStatus {
    /// Unrecognized values read as `Running`, the state a run is created in.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "partial" => Self::Partial,
            _ => Self::Running,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Partial => "partial",
        }
    }
}

/// Audit record of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRun {
    pub id: String,
    pub source: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub posts_collected: u64,
    pub error_message: Option<String>,
}

impl FromDocument for CollectionRun {
    const COLLECTION: &'static str = "collection_runs";

    fn from_document(doc: &Document) -> Self {
        let f = doc.fields();
        Self {
            id: doc.id.clone(),
            source: f.string(fields::SOURCE),
            started_at: f.timestamp(fields::STARTED_AT),
            completed_at: f.timestamp(fields::COMPLETED_AT),
            status: RunStatus::parse(&f.string(fields::STATUS)),
            posts_collected: f.count("posts_collected"),
            error_message: f.non_empty("error_message"),
        }
    }
}
