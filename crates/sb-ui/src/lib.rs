//! sns-briefing/crates/sb-ui/src/lib.rs
//!
//! HTML fragments and pages for the briefing feed. Everything here is a
//! pure string producer rendered through askama templates, which escape
//! user text. [`format::escape_html`] covers text placed by hand.

pub mod badges;
pub mod briefing;
pub mod card;
pub mod format;
pub mod page;
pub mod status;

pub use badges::*;
pub use briefing::*;
pub use card::*;
pub use format::*;
pub use page::*;
pub use status::*;

use askama::Template;

/// Askama only fails on formatter errors; log and fall back to nothing.
pub(crate) fn render_or_empty<T: Template>(template: &T, name: &str) -> String {
    match template.render() {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(template = name, error = %err, "template render failed");
            String::new()
        }
    }
}
