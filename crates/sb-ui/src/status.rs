//! Collection status fragments: 24h source counts, per-source health and
//! the recent runs table.

use crate::badges::source_badge;
use crate::format::{format_timestamp, truncate, TimeFormat};
use askama::Template;
use sb_core::models::{CollectionRun, RunStatus, Source};
use std::collections::BTreeMap;

const ERROR_MAX_LEN: usize = 120;

struct CountRow {
    badge: String,
    count: u64,
}

#[derive(Template)]
#[template(path = "source_counts.html")]
struct SourceCountsTemplate {
    rows: Vec<CountRow>,
    total: u64,
}

/// Per-source counts as a badge list, largest first. Ties keep name order.
pub fn render_source_counts(counts: &BTreeMap<String, u64>) -> String {
    let mut sorted: Vec<_> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1));

    let template = SourceCountsTemplate {
        rows: sorted
            .into_iter()
            .map(|(name, count)| CountRow {
                badge: source_badge(Source::parse(name).as_ref()),
                count: *count,
            })
            .collect(),
        total: counts.values().sum(),
    };
    crate::render_or_empty(&template, "source_counts")
}

fn status_style(status: &RunStatus) -> &'static str {
    match status {
        RunStatus::Success => "bg-green-100 text-green-700",
        RunStatus::Failed => "bg-red-100 text-red-700",
        RunStatus::Partial => "bg-amber-100 text-amber-700",
        RunStatus::Running => "bg-blue-100 text-blue-700",
    }
}

#[derive(Template)]
#[template(path = "run_row.html")]
struct RunRowTemplate<'a> {
    id: &'a str,
    source: &'a str,
    style: &'static str,
    status: &'static str,
    started: String,
    completed: String,
    posts: u64,
    error: String,
}

/// A `<tr>` for the collection status table.
pub fn render_run_row(run: &CollectionRun) -> String {
    let template = RunRowTemplate {
        id: &run.id,
        source: &run.source,
        style: status_style(&run.status),
        status: run.status.as_str(),
        started: format_timestamp(&run.started_at, TimeFormat::Short),
        completed: format_timestamp(&run.completed_at, TimeFormat::Short),
        posts: run.posts_collected,
        error: run
            .error_message
            .as_deref()
            .map(|message| truncate(message, ERROR_MAX_LEN))
            .unwrap_or_default(),
    };
    crate::render_or_empty(&template, "run_row")
}

#[derive(Template)]
#[template(path = "runs_table.html")]
struct RunsTableTemplate {
    rows: Vec<String>,
}

pub fn render_runs_table(runs: &[CollectionRun]) -> String {
    let template = RunsTableTemplate {
        rows: runs.iter().map(render_run_row).collect(),
    };
    crate::render_or_empty(&template, "runs_table")
}

/// Collector health for one source.
#[derive(Debug, Clone)]
pub struct SourceHealth {
    pub source: Source,
    pub last_success: Option<CollectionRun>,
    pub consecutive_failures: usize,
}

struct HealthRow<'a> {
    source: &'a str,
    badge: String,
    last_success: Option<String>,
    posts: u64,
    failures: usize,
}

#[derive(Template)]
#[template(path = "source_health.html")]
struct SourceHealthTemplate<'a> {
    rows: Vec<HealthRow<'a>>,
}

/// One row per source: when it last succeeded and how many runs have
/// failed since.
pub fn render_source_health(health: &[SourceHealth]) -> String {
    let rows = health
        .iter()
        .map(|h| HealthRow {
            source: h.source.as_str(),
            badge: source_badge(Some(&h.source)),
            last_success: h.last_success.as_ref().map(|run| {
                format_timestamp(&run.completed_at.or(run.started_at), TimeFormat::DateTime)
            }),
            posts: h.last_success.as_ref().map_or(0, |run| run.posts_collected),
            failures: h.consecutive_failures,
        })
        .collect();
    crate::render_or_empty(&SourceHealthTemplate { rows }, "source_health")
}
