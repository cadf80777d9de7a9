//! Assembles the static pages from feed queries.
//!
//! Feeds that page through the store (posts, per-source and per-category
//! posts, the briefing archive) become numbered series: `posts.html`,
//! `posts-2.html`, ... linked by a pager.

use anyhow::Context;
use sb_config::SiteConfig;
use sb_core::error::Result;
use sb_core::models::{Category, Post, Source};
use sb_core::query::{Cursor, Page as ResultPage};
use sb_query::{FeedQueries, PostQuery};
use sb_ui::{
    render_briefing_detail, render_briefing_summary, render_filter_bar, render_page, render_pager,
    render_post_cards, render_post_grid, render_runs_table, render_source_counts,
    render_source_health, set_active_nav, show_empty, show_error, FilterLink, Page, SourceHealth,
};
use std::future::Future;
use std::path::{Path, PathBuf};

pub const INDEX: &str = "index.html";
pub const POSTS: &str = "posts.html";
pub const BRIEFINGS: &str = "briefings.html";
pub const STATUS: &str = "status.html";
pub const SEARCH: &str = "search.html";

const NAV: [(&str, &str); 4] = [
    (INDEX, "Home"),
    (POSTS, "Posts"),
    (BRIEFINGS, "Briefings"),
    (STATUS, "Status"),
];

const FILTERS: &str = "filters";
const PAGER: &str = "pager";

/// One output file.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub file: String,
    pub html: String,
}

impl RenderedPage {
    fn new(file: impl Into<String>, html: String) -> Self {
        Self {
            file: file.into(),
            html,
        }
    }
}

/// File name of page `number` (from 1) of the series named `base`.
pub fn series_file(base: &str, number: usize) -> String {
    if number <= 1 {
        format!("{base}.html")
    } else {
        format!("{base}-{number}.html")
    }
}

/// Lowercased alphanumerics with every other run of characters collapsed
/// to a single `-`. Usable as an HTML id and as a file name.
pub fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Walks a paginated read from the start. Stops after a short or empty
/// page, at `max_pages`, or at a failure past the first page. The result
/// always holds at least one (possibly empty) page.
async fn collect_pages<T, F, Fut>(per_page: usize, max_pages: usize, mut fetch: F) -> Result<Vec<Vec<T>>>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<ResultPage<T>>>,
{
    let mut pages: Vec<Vec<T>> = Vec::new();
    let mut cursor = None;
    while pages.len() < max_pages {
        let page = match fetch(cursor.take()).await {
            Ok(page) => page,
            Err(err) if pages.is_empty() => return Err(err),
            Err(err) => {
                tracing::warn!(pages = pages.len(), error = %err, "paging stopped early");
                break;
            }
        };
        if page.is_empty() && !pages.is_empty() {
            break;
        }
        let short = page.len() < per_page;
        cursor = page.cursor;
        pages.push(page.items);
        if short || cursor.is_none() {
            break;
        }
    }
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    Ok(pages)
}

/// Puts a section's rendered result into its container. `None` from
/// `render` means "nothing to show"; a failed query shows the error.
fn fill<T>(
    page: &mut Page,
    container: &str,
    result: Result<T>,
    empty_message: &str,
    render: impl FnOnce(T) -> Option<String>,
) {
    match result {
        Ok(value) => match render(value) {
            Some(html) => {
                page.set_content(container, html);
            }
            None => show_empty(page, container, empty_message),
        },
        Err(err) => {
            tracing::warn!(section = container, error = %err, "section query failed");
            show_error(page, container, &err.to_string());
        }
    }
}

fn non_empty(html: String) -> Option<String> {
    (!html.is_empty()).then_some(html)
}

/// Layout of one numbered series.
struct Series<'a> {
    base: String,
    /// Nav entry highlighted on every page of the series
    nav: &'a str,
    /// Receives the empty and error states
    main: String,
    extra: &'a [&'a str],
    filters: Option<String>,
    empty_message: &'a str,
}

pub struct SiteGenerator {
    queries: FeedQueries,
    site: SiteConfig,
    search: Option<String>,
}

impl SiteGenerator {
    pub fn new(queries: FeedQueries, site: SiteConfig) -> Self {
        Self {
            queries,
            site,
            search: None,
        }
    }

    /// Also writes [`SEARCH`] with the posts matching `text`.
    pub fn with_search(mut self, text: Option<String>) -> Self {
        self.search = text.filter(|t| !t.trim().is_empty());
        self
    }

    fn shell(&self, nav_file: &str, containers: &[&str]) -> Page {
        let mut page = NAV
            .iter()
            .fold(Page::new(&self.site.title), |page, (href, label)| page.with_nav(*href, *label));
        for id in containers {
            page = page.with_container(*id);
        }
        set_active_nav(&mut page, nav_file);
        page
    }

    fn series_shell(&self, series: &Series<'_>) -> Page {
        let mut ids = Vec::with_capacity(series.extra.len() + 3);
        if series.filters.is_some() {
            ids.push(FILTERS);
        }
        ids.push(series.main.as_str());
        ids.extend(series.extra.iter().copied());
        ids.push(PAGER);

        let mut page = self.shell(series.nav, &ids);
        if let Some(filters) = &series.filters {
            page.set_content(FILTERS, filters.clone());
        }
        page
    }

    /// One file per collected page. A failed first read yields a single
    /// page showing the error.
    fn paged<T>(
        &self,
        series: &Series<'_>,
        pages: Result<Vec<Vec<T>>>,
        fill_page: impl Fn(&mut Page, &[T]),
    ) -> Vec<RenderedPage> {
        let pages = match pages {
            Ok(pages) => pages,
            Err(err) => {
                tracing::warn!(section = %series.main, error = %err, "section query failed");
                let mut page = self.series_shell(series);
                show_error(&mut page, &series.main, &err.to_string());
                return vec![RenderedPage::new(series_file(&series.base, 1), render_page(&page))];
            }
        };

        let total = pages.len();
        pages
            .iter()
            .enumerate()
            .map(|(index, items)| {
                let number = index + 1;
                let mut page = self.series_shell(series);
                if items.is_empty() {
                    show_empty(&mut page, &series.main, series.empty_message);
                } else {
                    fill_page(&mut page, items);
                }
                if total > 1 {
                    let prev = (number > 1).then(|| series_file(&series.base, number - 1));
                    let next = (number < total).then(|| series_file(&series.base, number + 1));
                    page.set_content(PAGER, render_pager(prev.as_deref(), next.as_deref(), number, total));
                }
                RenderedPage::new(series_file(&series.base, number), render_page(&page))
            })
            .collect()
    }

    async fn post_pages(&self, query: PostQuery) -> Result<Vec<Vec<Post>>> {
        let per_page = self.site.posts_per_page;
        let query = query.limit(per_page);
        let queries = &self.queries;
        collect_pages(per_page, self.site.max_pages, move |cursor| {
            let opts = query.clone().after(cursor);
            async move { queries.get_recent_posts(&opts).await }
        })
        .await
    }

    fn filter_bar(&self, categories: &[Category], active: &str) -> String {
        let link = |base: String, label: &str| FilterLink {
            active: base == active,
            href: series_file(&base, 1),
            label: label.to_string(),
        };
        let mut links = vec![link("posts".to_string(), "All")];
        links.extend(
            Source::KNOWN
                .iter()
                .map(|source| link(format!("posts-source-{}", slug(source.as_str())), source.as_str())),
        );
        links.extend(
            categories
                .iter()
                .map(|category| link(format!("posts-category-{}", slug(&category.id)), &category.name)),
        );
        render_filter_bar(&links)
    }

    pub async fn index(&self) -> String {
        let mut page = self.shell(INDEX, &["latest-briefing", "source-counts", "recent-posts"]);

        let latest = self.queries.get_latest_briefing().await;
        fill(&mut page, "latest-briefing", latest, "No briefing has been generated yet.", |b| {
            b.map(|b| render_briefing_detail(&b))
        });

        let counts = self.queries.get_source_counts_24h().await;
        fill(&mut page, "source-counts", counts, "", |counts| Some(render_source_counts(&counts)));

        let posts = self
            .queries
            .get_recent_posts(&PostQuery::new().limit(self.site.posts_per_page))
            .await;
        fill(&mut page, "recent-posts", posts, "No posts yet.", |feed| {
            non_empty(render_post_cards(&feed.items))
        });

        render_page(&page)
    }

    /// The whole feed, then one series per known source and per category.
    pub async fn posts(&self) -> Vec<RenderedPage> {
        let categories = match self.queries.get_categories().await {
            Ok(categories) => categories,
            Err(err) => {
                tracing::warn!(error = %err, "category query failed; filters limited to sources");
                Vec::new()
            }
        };

        let mut rendered = Vec::new();

        let base = "posts".to_string();
        let series = Series {
            filters: Some(self.filter_bar(&categories, &base)),
            base,
            nav: POSTS,
            main: "posts".to_string(),
            extra: &[],
            empty_message: "No posts yet.",
        };
        let pages = self.post_pages(PostQuery::new()).await;
        rendered.extend(self.paged(&series, pages, |page, posts| {
            page.set_content("posts", render_post_grid(posts, None));
        }));

        for source in Source::KNOWN {
            let base = format!("posts-source-{}", slug(source.as_str()));
            let series = Series {
                filters: Some(self.filter_bar(&categories, &base)),
                base,
                nav: POSTS,
                main: "posts".to_string(),
                extra: &[],
                empty_message: "No posts from this source.",
            };
            let pages = self.post_pages(PostQuery::new().source(source)).await;
            rendered.extend(self.paged(&series, pages, |page, posts| {
                page.set_content("posts", render_post_grid(posts, None));
            }));
        }

        for category in &categories {
            let id = slug(&category.id);
            let base = format!("posts-category-{id}");
            let series = Series {
                filters: Some(self.filter_bar(&categories, &base)),
                base,
                nav: POSTS,
                main: format!("category-{id}"),
                extra: &[],
                empty_message: "No posts in this category.",
            };
            let pages = self.post_pages(PostQuery::new().category(category.name.clone())).await;
            rendered.extend(self.paged(&series, pages, |page, posts| {
                page.set_content(&series.main, render_post_grid(posts, Some(&category.name)));
            }));
        }

        rendered
    }

    /// The briefing archive, newest first, every briefing in full below
    /// its page's list.
    pub async fn briefings(&self) -> Vec<RenderedPage> {
        let per_page = self.site.briefings_per_page;
        let queries = &self.queries;
        let pages = collect_pages(per_page, self.site.max_pages, move |cursor| {
            queries.get_briefings(per_page, cursor)
        })
        .await;

        let series = Series {
            base: "briefings".to_string(),
            nav: BRIEFINGS,
            main: "briefing-list".to_string(),
            extra: &["briefing-details"],
            filters: None,
            empty_message: "No briefings yet.",
        };
        self.paged(&series, pages, |page, briefings| {
            let list: String = briefings
                .iter()
                .map(|b| render_briefing_summary(b, &format!("#briefing-{}", b.id)))
                .collect();
            let details: String = briefings.iter().map(render_briefing_detail).collect();
            page.set_content("briefing-list", list);
            page.set_content("briefing-details", details);
        })
    }

    async fn source_health(&self) -> Result<Vec<SourceHealth>> {
        let mut health = Vec::with_capacity(Source::KNOWN.len());
        for source in Source::KNOWN {
            let last_success = self.queries.get_last_successful_run(&source).await?;
            let consecutive_failures = self.queries.count_consecutive_failures(&source).await?;
            health.push(SourceHealth {
                source,
                last_success,
                consecutive_failures,
            });
        }
        Ok(health)
    }

    pub async fn status(&self) -> String {
        let mut page = self.shell(STATUS, &["source-counts", "source-health", "runs"]);

        let counts = self.queries.get_source_counts_24h().await;
        fill(&mut page, "source-counts", counts, "", |counts| Some(render_source_counts(&counts)));

        let health = self.source_health().await;
        fill(&mut page, "source-health", health, "", |health| Some(render_source_health(&health)));

        let runs = self.queries.get_recent_runs(self.site.runs_limit).await;
        fill(&mut page, "runs", runs, "No collection runs recorded.", |runs| {
            (!runs.is_empty()).then(|| render_runs_table(&runs))
        });

        render_page(&page)
    }

    /// One page of the feed filtered by `text`.
    pub async fn search(&self, text: &str) -> String {
        let mut page = self.shell(POSTS, &["search-results"]);
        let query = PostQuery::new().search(text).limit(self.site.posts_per_page);
        let posts = self.queries.get_recent_posts(&query).await;
        let empty_message = format!("No posts match \"{text}\".");
        fill(&mut page, "search-results", posts, &empty_message, |feed| {
            (!feed.is_empty()).then(|| render_post_grid(&feed.items, None))
        });
        render_page(&page)
    }

    /// Every page of the site, in write order.
    pub async fn render_all(&self) -> Vec<RenderedPage> {
        let mut rendered = vec![RenderedPage::new(INDEX, self.index().await)];
        rendered.extend(self.posts().await);
        rendered.extend(self.briefings().await);
        rendered.push(RenderedPage::new(STATUS, self.status().await));
        if let Some(text) = &self.search {
            rendered.push(RenderedPage::new(SEARCH, self.search(text).await));
        }
        rendered
    }

    /// Renders every page and writes it under `dir`.
    pub async fn write_to(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let pages = self.render_all().await;
        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let path = dir.join(&page.file);
            tokio::fs::write(&path, page.html)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "page written");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sb_core::traits::MockDocumentStore;
    use sb_core::value::Document;
    use sb_store_memory::MemoryDocumentStore;
    use std::sync::Arc;

    fn generator(store: impl sb_core::traits::DocumentStore + 'static) -> SiteGenerator {
        SiteGenerator::new(FeedQueries::new(Arc::new(store)), SiteConfig::default())
    }

    fn generator_with(store: MemoryDocumentStore, site: SiteConfig) -> SiteGenerator {
        SiteGenerator::new(FeedQueries::new(Arc::new(store)), site)
    }

    fn seeded() -> MemoryDocumentStore {
        let now = Utc::now();
        let store = MemoryDocumentStore::new();
        store.insert(
            "posts",
            Document::new("p1")
                .with("source", "twitter")
                .with("author", "alice")
                .with("content_text", "New accelerator announced")
                .with("category_names", vec!["AI"])
                .with("is_relevant", true)
                .with("collected_at", now - Duration::minutes(5)),
        );
        store.insert("categories", Document::new("AI"));
        store.insert("categories", Document::new("Big Tech"));
        store.insert(
            "briefings",
            Document::new("b1").with("title", "Morning").with("generated_at", now),
        );
        store.insert(
            "collection_runs",
            Document::new("r1")
                .with("source", "twitter")
                .with("status", "success")
                .with("started_at", now - Duration::minutes(10))
                .with("completed_at", now - Duration::minutes(8)),
        );
        store
    }

    fn briefings_store(count: usize) -> MemoryDocumentStore {
        let now = Utc::now();
        let store = MemoryDocumentStore::new();
        for i in 0..count {
            store.insert(
                "briefings",
                Document::new(format!("b{i:02}"))
                    .with("title", format!("Briefing {i}"))
                    .with("generated_at", now - Duration::minutes(i as i64)),
            );
        }
        store
    }

    fn page<'a>(pages: &'a [RenderedPage], file: &str) -> &'a str {
        pages
            .iter()
            .find(|p| p.file == file)
            .map(|p| p.html.as_str())
            .unwrap_or_else(|| panic!("{file} not rendered"))
    }

    #[test]
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(slug("Big Tech"), "big-tech");
        assert_eq!(slug("  AI / ML "), "ai-ml");
        assert_eq!(slug("Semiconductor"), "semiconductor");
        assert_eq!(slug("반도체"), "반도체");
        assert_eq!(slug("!!!"), "untitled");
    }

    #[test]
    fn series_files_number_from_two() {
        assert_eq!(series_file("posts", 1), "posts.html");
        assert_eq!(series_file("posts", 2), "posts-2.html");
        assert_eq!(series_file("posts-category-big-tech", 3), "posts-category-big-tech-3.html");
    }

    #[tokio::test]
    async fn index_has_every_section() {
        let html = generator(seeded()).index().await;
        assert!(html.contains("Morning"));
        assert!(html.contains("total 1"));
        assert!(html.contains("New accelerator announced"));
        assert!(html.contains(r#"href="index.html" class="text-sm nav-active""#));
    }

    #[tokio::test]
    async fn posts_series_per_source_and_category() {
        let pages = generator(seeded()).posts().await;
        let files: Vec<_> = pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(
            files,
            [
                "posts.html",
                "posts-source-twitter.html",
                "posts-source-threads.html",
                "posts-source-linkedin.html",
                "posts-source-dcinside.html",
                "posts-category-ai.html",
                "posts-category-big-tech.html",
            ]
        );

        let all = page(&pages, "posts.html");
        assert!(all.contains("New accelerator announced"));
        assert!(all.contains(r#"href="posts-category-big-tech.html""#));
        assert!(all.contains(r#"href="posts.html" class="text-sm nav-active""#));

        let ai = page(&pages, "posts-category-ai.html");
        assert!(ai.contains(r#"id="category-ai""#));
        assert!(ai.contains("New accelerator announced"));

        let big_tech = page(&pages, "posts-category-big-tech.html");
        assert!(big_tech.contains(r#"id="category-big-tech""#));
        assert!(!big_tech.contains("category-Big Tech"));
        assert!(big_tech.contains("No posts in this category."));

        let threads = page(&pages, "posts-source-threads.html");
        assert!(threads.contains("No posts from this source."));
        assert!(page(&pages, "posts-source-twitter.html").contains("New accelerator announced"));
    }

    #[tokio::test]
    async fn posts_continue_on_numbered_pages() {
        let now = Utc::now();
        let store = MemoryDocumentStore::new();
        for i in 0..5 {
            store.insert(
                "posts",
                Document::new(format!("p{i}"))
                    .with("source", "twitter")
                    .with("content_text", format!("post number {i}"))
                    .with("is_relevant", true)
                    .with("collected_at", now - Duration::minutes(i)),
            );
        }
        let site = SiteConfig {
            posts_per_page: 2,
            ..SiteConfig::default()
        };
        let pages = generator_with(store, site).posts().await;

        assert!(page(&pages, "posts.html").contains("post number 0"));
        assert!(page(&pages, "posts-2.html").contains("post number 2"));
        let last = page(&pages, "posts-3.html");
        assert!(last.contains("post number 4"));
        assert!(last.contains("Page 3 of 3"));
        assert!(!pages.iter().any(|p| p.file == "posts-4.html"));
        assert!(page(&pages, "posts-source-twitter-3.html").contains("post number 4"));
    }

    #[tokio::test]
    async fn briefings_past_the_first_page_are_written() {
        let pages = generator(briefings_store(25)).briefings().await;
        let files: Vec<_> = pages.iter().map(|p| p.file.as_str()).collect();
        assert_eq!(files, ["briefings.html", "briefings-2.html"]);

        let first = page(&pages, "briefings.html");
        assert!(first.contains(r#"id="briefing-b00""#));
        assert!(!first.contains(r#"id="briefing-b24""#));
        assert!(first.contains(r#"href="briefings-2.html""#));

        let second = page(&pages, "briefings-2.html");
        assert_eq!(second.matches("briefing-summary").count(), 5);
        assert!(second.contains(r#"id="briefing-b24""#));
        assert!(second.contains(r##"href="#briefing-b24""##));
        assert!(second.contains("pager-prev"));
        assert!(!second.contains("pager-next"));
    }

    #[tokio::test]
    async fn full_last_page_adds_no_empty_page() {
        let pages = generator(briefings_store(20)).briefings().await;
        assert_eq!(pages.len(), 1);
        assert!(!pages[0].html.contains("pager-current"));
    }

    #[tokio::test]
    async fn page_count_is_capped() {
        let site = SiteConfig {
            briefings_per_page: 5,
            max_pages: 2,
            ..SiteConfig::default()
        };
        let pages = generator_with(briefings_store(25), site).briefings().await;
        assert_eq!(pages.len(), 2);
        assert!(page(&pages, "briefings-2.html").contains("Page 2 of 2"));
    }

    #[tokio::test]
    async fn status_page_shows_runs_and_source_health() {
        let status = generator(seeded()).status().await;
        assert!(status.contains("run-row"));
        assert!(status.contains(">success<"));
        assert_eq!(status.matches("health-row").count(), Source::KNOWN.len());
        assert_eq!(status.matches("last-success").count(), 1);
        assert_eq!(status.matches("never-succeeded").count(), Source::KNOWN.len() - 1);
    }

    #[tokio::test]
    async fn failing_store_renders_error_sections() {
        let mut mock = MockDocumentStore::new();
        mock.expect_run_query()
            .returning(|_| Err(anyhow::anyhow!("PERMISSION_DENIED")));
        let generator = generator(mock);

        let html = generator.index().await;
        assert_eq!(html.matches("error-state").count(), 3);
        assert!(html.contains("PERMISSION_DENIED"));

        let status = generator.status().await;
        assert_eq!(status.matches("error-state").count(), 3);

        let posts = generator.posts().await;
        assert_eq!(posts.len(), 1 + Source::KNOWN.len());
        assert!(posts.iter().all(|p| p.html.contains("error-state")));
    }

    #[tokio::test]
    async fn empty_store_shows_empty_states() {
        let pages = generator(MemoryDocumentStore::new()).briefings().await;
        assert_eq!(pages.len(), 1);
        assert!(pages[0].html.contains("No briefings yet."));
    }

    #[tokio::test]
    async fn search_page_filters_the_feed() {
        let generator = generator(seeded());
        assert!(generator.search("ACCELERATOR").await.contains("New accelerator announced"));
        let miss = generator.search("quantum").await;
        assert!(miss.contains("empty-state"));
        assert!(!miss.contains("data-flip-card"));
    }

    #[tokio::test]
    async fn writes_all_pages() {
        let dir = std::env::temp_dir().join(format!("sns-briefing-site-{}", std::process::id()));
        let generator = generator(seeded()).with_search(Some("accelerator".into()));
        let written = generator.write_to(&dir).await.unwrap();
        // index, 7 post pages, briefings, status, search
        assert_eq!(written.len(), 11);
        for path in &written {
            assert!(path.exists());
        }
        assert!(dir.join(SEARCH).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
