//! Page shell: named containers whose content is replaced wholesale, plus
//! the navigation bar.

use crate::card::{skeleton_cards, DEFAULT_SKELETON_COUNT};
use askama::Template;

const PAGE_CSS: &str = r#"
.spinner { width: 1.5rem; height: 1.5rem; border: 3px solid #e5e7eb; border-top-color: #6366f1; border-radius: 9999px; animation: spin 0.8s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.skeleton { background: linear-gradient(90deg, #f3f4f6 25%, #e5e7eb 50%, #f3f4f6 75%); background-size: 200% 100%; animation: shimmer 1.2s infinite; border-radius: 0.25rem; }
@keyframes shimmer { to { background-position: -200% 0; } }
.flip-card { perspective: 1000px; cursor: pointer; min-height: 12rem; }
.flip-card-inner { position: relative; width: 100%; height: 100%; transition: transform 0.5s; transform-style: preserve-3d; }
.flip-card.flipped .flip-card-inner { transform: rotateY(180deg); }
.flip-card-front, .flip-card-back { position: absolute; inset: 0; backface-visibility: hidden; overflow: hidden; }
.flip-card-back { transform: rotateY(180deg); overflow-y: auto; }
.nav-active { font-weight: 700; color: #4f46e5; }
"#;

const ERROR_HINT: &str = "Check the Firebase configuration.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub href: String,
    pub label: String,
    /// Opts the link into [`set_active_nav`]
    pub nav: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub content: String,
}

#[derive(Template, Debug, Clone)]
#[template(path = "page.html")]
pub struct Page {
    pub title: String,
    pub nav: Vec<NavLink>,
    pub containers: Vec<Container>,
    css: &'static str,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nav: Vec::new(),
            containers: Vec::new(),
            css: PAGE_CSS,
        }
    }

    /// Adds a link that takes part in active highlighting.
    pub fn with_nav(mut self, href: impl Into<String>, label: impl Into<String>) -> Self {
        self.nav.push(NavLink {
            href: href.into(),
            label: label.into(),
            nav: true,
            active: false,
        });
        self
    }

    /// Adds a plain link that is never highlighted.
    pub fn with_link(mut self, href: impl Into<String>, label: impl Into<String>) -> Self {
        self.nav.push(NavLink {
            href: href.into(),
            label: label.into(),
            nav: false,
            active: false,
        });
        self
    }

    /// Adds an empty container. Duplicate ids are ignored.
    pub fn with_container(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if self.container(&id).is_none() {
            self.containers.push(Container {
                id,
                content: String::new(),
            });
        }
        self
    }

    pub fn container(&self, id: &str) -> Option<&str> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.content.as_str())
    }

    /// Replaces a container's content. Returns `false` if no such container.
    pub fn set_content(&mut self, id: &str, html: impl Into<String>) -> bool {
        match self.containers.iter_mut().find(|c| c.id == id) {
            Some(container) => {
                container.content = html.into();
                true
            }
            None => false,
        }
    }
}

pub fn loading_fragment() -> String {
    r#"<div class="flex justify-center items-center py-12"><div class="spinner"></div><span class="ml-3 text-gray-400 text-sm">Loading...</span></div>"#.to_string()
}

#[derive(Template)]
#[template(path = "error_state.html")]
struct ErrorStateTemplate<'a> {
    message: &'a str,
    hint: &'a str,
}

#[derive(Template)]
#[template(path = "empty_state.html")]
struct EmptyStateTemplate<'a> {
    message: &'a str,
}

pub fn error_fragment(message: &str) -> String {
    crate::render_or_empty(&ErrorStateTemplate { message, hint: ERROR_HINT }, "error_state")
}

pub fn empty_fragment(message: &str) -> String {
    crate::render_or_empty(&EmptyStateTemplate { message }, "empty_state")
}

#[derive(Template)]
#[template(path = "pager.html")]
struct PagerTemplate<'a> {
    prev: Option<&'a str>,
    next: Option<&'a str>,
    current: usize,
    total: usize,
}

/// Newer/older links between the numbered pages of one series.
pub fn render_pager(prev: Option<&str>, next: Option<&str>, current: usize, total: usize) -> String {
    crate::render_or_empty(&PagerTemplate { prev, next, current, total }, "pager")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "filter_bar.html")]
struct FilterBarTemplate<'a> {
    links: &'a [FilterLink],
}

pub fn render_filter_bar(links: &[FilterLink]) -> String {
    crate::render_or_empty(&FilterBarTemplate { links }, "filter_bar")
}

pub fn show_loading(page: &mut Page, id: &str) {
    page.set_content(id, loading_fragment());
}

/// Same as [`show_loading`] but with card-shaped placeholders.
pub fn show_skeleton(page: &mut Page, id: &str) {
    page.set_content(id, skeleton_cards(DEFAULT_SKELETON_COUNT));
}

pub fn show_error(page: &mut Page, id: &str, message: &str) {
    page.set_content(id, error_fragment(message));
}

pub fn show_empty(page: &mut Page, id: &str, message: &str) {
    page.set_content(id, empty_fragment(message));
}

/// Marks `nav` links whose href `path` ends with. A `/`-terminated path
/// is the index page. Links already active stay active.
pub fn set_active_nav(page: &mut Page, path: &str) {
    let is_index = path.ends_with('/');
    for link in page.nav.iter_mut().filter(|l| l.nav) {
        if path.ends_with(link.href.as_str()) || (is_index && link.href == "index.html") {
            link.active = true;
        }
    }
}

pub fn render_page(page: &Page) -> String {
    crate::render_or_empty(page, "page")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new("SNS Briefing")
            .with_nav("index.html", "Home")
            .with_nav("posts.html", "Posts")
            .with_link("https://github.com", "Source")
            .with_container("feed")
    }

    #[test]
    fn show_helpers_replace_content() {
        let mut page = page();
        show_loading(&mut page, "feed");
        assert!(page.container("feed").unwrap().contains("spinner"));

        show_error(&mut page, "feed", "permission <denied>");
        let html = page.container("feed").unwrap();
        assert!(html.contains("error-state"));
        assert!(html.contains("permission "));
        assert!(!html.contains("<denied>"));
        assert!(html.contains(ERROR_HINT));
        assert!(!html.contains("spinner"));

        show_empty(&mut page, "feed", "No posts yet");
        assert!(page.container("feed").unwrap().contains("No posts yet"));

        show_skeleton(&mut page, "feed");
        assert_eq!(page.container("feed").unwrap().matches("skeleton-card").count(), DEFAULT_SKELETON_COUNT);
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let mut page = page();
        show_error(&mut page, "nope", "boom");
        show_loading(&mut page, "nope");
        assert_eq!(page.containers.len(), 1);
        assert_eq!(page.container("feed"), Some(""));
        assert!(!page.set_content("nope", "x"));
    }

    #[test]
    fn active_nav_by_suffix() {
        let mut page = page();
        set_active_nav(&mut page, "/site/posts.html");
        let active: Vec<_> = page.nav.iter().filter(|l| l.active).map(|l| l.href.as_str()).collect();
        assert_eq!(active, ["posts.html"]);
    }

    #[test]
    fn trailing_slash_selects_index() {
        let mut page = page();
        set_active_nav(&mut page, "/site/");
        assert!(page.nav[0].active);
        assert!(!page.nav[1].active);
    }

    #[test]
    fn untagged_links_are_ignored() {
        let mut page = Page::new("t").with_link("index.html", "Home");
        set_active_nav(&mut page, "/index.html");
        assert!(!page.nav[0].active);
    }

    #[test]
    fn pager_links_only_existing_neighbours() {
        let first = render_pager(None, Some("posts-2.html"), 1, 3);
        assert!(first.contains(r#"class="pager-next text-indigo-600" href="posts-2.html""#));
        assert!(!first.contains("pager-prev"));
        assert!(first.contains("Page 1 of 3"));

        let last = render_pager(Some("posts-2.html"), None, 3, 3);
        assert!(last.contains("pager-prev"));
        assert!(!last.contains("pager-next"));
    }

    #[test]
    fn filter_bar_marks_the_active_link() {
        let links = [
            FilterLink { href: "posts.html".into(), label: "All".into(), active: false },
            FilterLink { href: "posts-source-twitter.html".into(), label: "twitter".into(), active: true },
        ];
        let html = render_filter_bar(&links);
        assert_eq!(html.matches("filter-link").count(), 2);
        assert_eq!(html.matches("filter-active").count(), 1);
        let active = html.find("filter-active").unwrap();
        assert!(html[active..].contains(">twitter<"));
    }

    #[test]
    fn render_includes_nav_and_sections() {
        let mut page = page();
        set_active_nav(&mut page, "/index.html");
        page.set_content("feed", "<p>hello</p>");
        let html = render_page(&page);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<section id="feed"><p>hello</p></section>"#));
        assert!(html.contains("nav-active"));
        assert!(html.contains("data-nav"));
        assert!(html.contains(".flip-card"));
    }
}
