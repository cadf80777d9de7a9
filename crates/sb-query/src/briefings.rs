//! Briefing reads: latest, archive pages and point lookups.

use crate::{check_limit, FeedQueries};
use sb_core::error::Result;
use sb_core::models::{fields, Briefing};
use sb_core::query::{Cursor, Direction, Page, Query};
use sb_core::traits::FromDocument;

fn newest_first() -> Query {
    Query::collection(Briefing::COLLECTION).order_by(fields::GENERATED_AT, Direction::Descending)
}

impl FeedQueries {
    /// The most recently generated briefing, if any exists.
    pub async fn get_latest_briefing(&self) -> Result<Option<Briefing>> {
        let briefings: Vec<Briefing> = self.fetch_all(&newest_first().limit(1)).await?;
        Ok(briefings.into_iter().next())
    }

    /// One archive page, newest first. Pass the previous page's cursor to
    /// continue; see [`crate::DEFAULT_BRIEFING_LIMIT`] for the usual size.
    pub async fn get_briefings(&self, limit: usize, cursor: Option<Cursor>) -> Result<Page<Briefing>> {
        let mut query = newest_first();
        if let Some(cursor) = cursor {
            query = query.start_after(cursor);
        }
        let query = query.limit(check_limit(limit)?);

        let docs = self.fetch(&query).await?;
        let cursor = docs.last().and_then(|last| query.cursor_after(last));
        Ok(Page::new(docs.iter().map(Briefing::from_document).collect(), cursor))
    }

    pub async fn get_briefing_by_id(&self, id: &str) -> Result<Option<Briefing>> {
        self.fetch_one(id).await
    }
}
