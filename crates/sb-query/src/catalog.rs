//! Reference data and ingestion audit reads.

use crate::{check_limit, FeedQueries};
use sb_core::error::Result;
use sb_core::models::{fields, Category, CollectionRun, RunStatus, Source};
use sb_core::query::{Direction, FilterOp, Query};
use sb_core::traits::FromDocument;

/// Runs inspected by [`FeedQueries::count_consecutive_failures`].
pub const FAILURE_LOOKBACK: usize = 10;

impl FeedQueries {
    /// Full, unordered scan of the category reference list.
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        self.fetch_all(&Query::collection(Category::COLLECTION)).await
    }

    /// Most recent ingestion runs, newest `started_at` first.
    pub async fn get_recent_runs(&self, limit: usize) -> Result<Vec<CollectionRun>> {
        let query = Query::collection(CollectionRun::COLLECTION)
            .order_by(fields::STARTED_AT, Direction::Descending)
            .limit(check_limit(limit)?);
        self.fetch_all(&query).await
    }

    /// The successful run of `source` that completed last.
    pub async fn get_last_successful_run(&self, source: &Source) -> Result<Option<CollectionRun>> {
        let query = Query::collection(CollectionRun::COLLECTION)
            .filter(fields::SOURCE, FilterOp::Equal, source.as_str())
            .filter(fields::STATUS, FilterOp::Equal, RunStatus::Success.as_str())
            .order_by(fields::COMPLETED_AT, Direction::Descending)
            .limit(1);
        let runs: Vec<CollectionRun> = self.fetch_all(&query).await?;
        Ok(runs.into_iter().next())
    }

    /// Failed runs of `source` since its last non-failed one, looking back
    /// over at most [`FAILURE_LOOKBACK`] runs.
    pub async fn count_consecutive_failures(&self, source: &Source) -> Result<usize> {
        let query = Query::collection(CollectionRun::COLLECTION)
            .filter(fields::SOURCE, FilterOp::Equal, source.as_str())
            .order_by(fields::STARTED_AT, Direction::Descending)
            .limit(FAILURE_LOOKBACK);
        let runs: Vec<CollectionRun> = self.fetch_all(&query).await?;
        Ok(runs.iter().take_while(|run| run.status == RunStatus::Failed).count())
    }
}
