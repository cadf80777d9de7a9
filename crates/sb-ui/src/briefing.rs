//! Briefing archive entries and the full briefing view.

use crate::badges::{category_badge, importance_stars};
use crate::format::{format_timestamp, truncate, TimeFormat};
use askama::Template;
use sb_core::models::Briefing;

const SUMMARY_TEXT_LEN: usize = 160;

struct ItemView<'a> {
    stars: &'static str,
    category: String,
    headline: &'a str,
    body: &'a str,
    sources_summary: &'a str,
}

#[derive(Template)]
#[template(path = "briefing_detail.html")]
struct BriefingDetailTemplate<'a> {
    id: &'a str,
    title: &'a str,
    briefing_type: &'a str,
    generated: String,
    period: String,
    total_posts: u64,
    items: Vec<ItemView<'a>>,
}

#[derive(Template)]
#[template(path = "briefing_summary.html")]
struct BriefingSummaryTemplate<'a> {
    href: &'a str,
    kind: &'a str,
    time: String,
    title: &'a str,
    teaser: String,
    items: usize,
    posts: u64,
}

/// One archive list entry linking to `href`.
pub fn render_briefing_summary(briefing: &Briefing, href: &str) -> String {
    let teaser = briefing
        .content_text
        .as_deref()
        .or_else(|| briefing.items.first().map(|item| item.headline.as_str()))
        .map(|text| truncate(text, SUMMARY_TEXT_LEN))
        .unwrap_or_default();

    let template = BriefingSummaryTemplate {
        href,
        kind: &briefing.briefing_type,
        time: format_timestamp(&briefing.generated_at, TimeFormat::DateTime),
        title: &briefing.title,
        teaser,
        items: briefing.items.len(),
        posts: briefing.total_posts_analyzed,
    };
    crate::render_or_empty(&template, "briefing_summary")
}

/// The full briefing with its items in `sort_order`.
pub fn render_briefing_detail(briefing: &Briefing) -> String {
    let mut items: Vec<_> = briefing.items.iter().collect();
    items.sort_by_key(|item| item.sort_order);

    let period = match (briefing.period_start, briefing.period_end) {
        (Some(start), Some(end)) => format!(
            "{} ~ {}",
            format_timestamp(&start, TimeFormat::Short),
            format_timestamp(&end, TimeFormat::Short)
        ),
        _ => String::new(),
    };

    let template = BriefingDetailTemplate {
        id: &briefing.id,
        title: &briefing.title,
        briefing_type: &briefing.briefing_type,
        generated: format_timestamp(&briefing.generated_at, TimeFormat::DateTime),
        period,
        total_posts: briefing.total_posts_analyzed,
        items: items
            .into_iter()
            .map(|item| ItemView {
                stars: importance_stars(Some(item.importance_score)),
                category: item.category_name.as_deref().map(category_badge).unwrap_or_default(),
                headline: &item.headline,
                body: &item.body,
                sources_summary: &item.sources_summary,
            })
            .collect(),
    };
    crate::render_or_empty(&template, "briefing_detail")
}
