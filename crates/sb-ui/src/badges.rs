//! Fixed style tables and the small badges built from them.
//!
//! Every table has an explicit fallback entry; unknown keys are never an
//! error.

use askama::Template;
use sb_core::models::Source;

const SOURCE_STYLES: &[(&str, &str)] = &[
    ("twitter", "bg-blue-100 text-blue-700"),
    ("threads", "bg-purple-100 text-purple-700"),
    ("linkedin", "bg-sky-100 text-sky-700"),
    ("dcinside", "bg-gray-100 text-gray-700"),
];
pub const FALLBACK_SOURCE_STYLE: &str = "bg-slate-100 text-slate-600";

const CATEGORY_STYLES: &[(&str, &str)] = &[
    ("AI", "bg-indigo-100 text-indigo-700"),
    ("Semiconductor", "bg-amber-100 text-amber-700"),
    ("Cloud", "bg-sky-100 text-sky-700"),
    ("BigTech", "bg-emerald-100 text-emerald-700"),
    ("Startup", "bg-pink-100 text-pink-700"),
    ("Regulation", "bg-red-100 text-red-700"),
    ("Other", "bg-gray-100 text-gray-600"),
];
pub const FALLBACK_CATEGORY_STYLE: &str = "bg-gray-100 text-gray-600";

/// Keyword chip styles by position. The last entry is the overflow style
/// shared by every position past the table.
const KEYWORD_STYLES: &[&str] = &[
    "bg-indigo-600 text-white font-semibold",
    "bg-indigo-100 text-indigo-700 font-medium",
    "bg-sky-100 text-sky-700",
    "bg-emerald-100 text-emerald-700",
    "bg-gray-100 text-gray-600",
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, style)| *style)
}

pub fn source_color(source: Option<&Source>) -> &'static str {
    source
        .and_then(|s| lookup(SOURCE_STYLES, s.as_str()))
        .unwrap_or(FALLBACK_SOURCE_STYLE)
}

pub fn category_color(name: &str) -> &'static str {
    lookup(CATEGORY_STYLES, name).unwrap_or(FALLBACK_CATEGORY_STYLE)
}

pub fn keyword_style(position: usize) -> &'static str {
    KEYWORD_STYLES[position.min(KEYWORD_STYLES.len() - 1)]
}

#[derive(Template)]
#[template(path = "badge.html")]
struct BadgeTemplate<'a> {
    class: String,
    text: &'a str,
}

fn badge(kind: &str, style: &str, text: &str) -> String {
    let template = BadgeTemplate {
        class: format!("{kind} {style}"),
        text,
    };
    crate::render_or_empty(&template, kind)
}

pub fn source_badge(source: Option<&Source>) -> String {
    let label = source.map(Source::as_str).unwrap_or("unknown");
    badge("source-badge", &format!("text-xs px-2 py-0.5 rounded {}", source_color(source)), label)
}

/// NaN and infinities carry no usable weight.
fn usable(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite())
}

/// Five-tier star rating. Absent scores render nothing.
pub fn importance_stars(score: Option<f64>) -> &'static str {
    match usable(score) {
        None => "",
        Some(s) if s >= 0.9 => "★★★★★",
        Some(s) if s >= 0.7 => "★★★★☆",
        Some(s) if s >= 0.5 => "★★★☆☆",
        Some(s) if s >= 0.3 => "★★☆☆☆",
        Some(_) => "★☆☆☆☆",
    }
}

/// Three-tier numeric badge. Absent scores render nothing.
pub fn importance_badge(score: Option<f64>) -> String {
    let Some(score) = usable(score) else {
        return String::new();
    };
    let tier = if score >= 0.8 {
        "importance-high bg-red-100 text-red-700"
    } else if score >= 0.6 {
        "importance-medium bg-amber-100 text-amber-700"
    } else {
        "importance-low bg-gray-100 text-gray-600"
    };
    badge(
        "importance-badge",
        &format!("text-xs font-semibold px-1.5 py-0.5 rounded {tier}"),
        &format!("{score:.2}"),
    )
}

pub fn category_badge(name: &str) -> String {
    badge("category-badge", &format!("text-xs px-1.5 py-0.5 rounded {}", category_color(name)), name)
}
