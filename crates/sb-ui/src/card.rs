//! Flip-card markup for posts and the skeleton placeholders shown while a
//! page is loading.
//!
//! Cards carry a `data-flip-card` attribute; toggling the `flipped` class
//! on click belongs to the page's own event handling.

use crate::badges::{category_badge, importance_badge, keyword_style, source_badge};
use crate::format::{format_timestamp, truncate, TimeFormat};
use askama::Template;
use sb_core::models::Post;

pub const MAX_KEYWORDS: usize = 5;
pub const AUTHOR_MAX_LEN: usize = 20;
pub const BODY_MAX_LEN: usize = 300;
pub const DEFAULT_SKELETON_COUNT: usize = 6;
pub const NO_KEYWORDS: &str = "No keywords";

struct KeywordChip<'a> {
    text: &'a str,
    class: &'static str,
}

#[derive(Template)]
#[template(path = "post_card.html")]
struct PostCardTemplate<'a> {
    id: &'a str,
    source_badge: String,
    importance_badge: String,
    keywords: Vec<KeywordChip<'a>>,
    no_keywords: &'a str,
    author_short: String,
    time: String,
    categories: Vec<String>,
    body: String,
    author: &'a str,
    url: Option<&'a str>,
}

/// Only absolute http(s) links are rendered.
pub fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

pub fn render_post_card(post: &Post) -> String {
    let keywords = post
        .keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .take(MAX_KEYWORDS)
        .enumerate()
        .map(|(position, text)| KeywordChip {
            text,
            class: keyword_style(position),
        })
        .collect();

    let body = match &post.summary {
        Some(summary) => summary.clone(),
        None => truncate(&post.content_text, BODY_MAX_LEN),
    };

    let template = PostCardTemplate {
        id: &post.id,
        source_badge: source_badge(post.source.as_ref()),
        importance_badge: importance_badge(post.importance_score),
        keywords,
        no_keywords: NO_KEYWORDS,
        author_short: truncate(&post.author, AUTHOR_MAX_LEN),
        time: format_timestamp(&post.collected_at, TimeFormat::Short),
        categories: post.category_names.iter().map(|c| category_badge(c)).collect(),
        body,
        author: &post.author,
        url: post.url.as_deref().filter(|u| is_safe_url(u)),
    };
    crate::render_or_empty(&template, "post_card")
}

/// Renders every post as a card, in order.
pub fn render_post_cards(posts: &[Post]) -> String {
    posts.iter().map(render_post_card).collect()
}

#[derive(Template)]
#[template(path = "post_grid.html")]
struct PostGridTemplate {
    heading: Option<String>,
    cards: Vec<String>,
}

/// Cards laid out in a grid, under a category badge when one is given.
pub fn render_post_grid(posts: &[Post], category: Option<&str>) -> String {
    let template = PostGridTemplate {
        heading: category.map(category_badge),
        cards: posts.iter().map(render_post_card).collect(),
    };
    crate::render_or_empty(&template, "post_grid")
}

const SKELETON_CARD: &str = r#"<div class="skeleton-card bg-white rounded-lg shadow p-4">
  <div class="flex items-center gap-2 mb-3">
    <div class="skeleton w-16 h-5"></div>
    <div class="skeleton w-10 h-5"></div>
  </div>
  <div class="flex gap-1 mb-3">
    <div class="skeleton w-14 h-4"></div>
    <div class="skeleton w-12 h-4"></div>
    <div class="skeleton w-16 h-4"></div>
  </div>
  <div class="skeleton w-3/4 h-4"></div>
</div>
"#;

/// `count` placeholder cards; see [`DEFAULT_SKELETON_COUNT`].
pub fn skeleton_cards(count: usize) -> String {
    SKELETON_CARD.repeat(count)
}
