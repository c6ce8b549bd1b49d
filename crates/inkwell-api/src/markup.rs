//! Markdown rendering and HTML sanitizing for user-submitted text.
//!
//! Stored titles and bodies go through [`Markup::strip`] before they reach the
//! database. Bodies are only turned into HTML at display time with
//! [`Markup::render`], so the stored form stays re-renderable source.

use std::collections::HashSet;

use ammonia::Builder;
use pulldown_cmark::{Parser, html};

/// Structural and text-formatting tags that survive rendering. No attributes
/// are allowed on any of them.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "ul", "ol", "li", "strong", "em", "i", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Removed together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Markup;

impl Markup {
    /// Markdown source to allow-listed HTML, safe to embed unescaped.
    pub fn render(&self, source: &str) -> String {
        let mut unsafe_html = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut unsafe_html, Parser::new(source));

        Builder::empty()
            .tags(tag_set(ALLOWED_TAGS))
            .clean_content_tags(tag_set(DROPPED_WITH_CONTENT))
            .clean(&unsafe_html)
            .to_string()
    }

    /// Remove every tag and attribute, keeping escaped text. Idempotent.
    pub fn strip(&self, text: &str) -> String {
        Builder::empty()
            .clean_content_tags(tag_set(DROPPED_WITH_CONTENT))
            .clean(text)
            .to_string()
    }
}

fn tag_set(tags: &[&'static str]) -> HashSet<&'static str> {
    tags.iter().copied().collect()
}
