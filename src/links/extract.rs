// src/links/extract.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// Every <a href="..."> on the page lands in exactly one of two sets:
// - external: the href starts with "http" (points off-site, or absolute)
// - internal: anything else (relative to the current page)
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// =============================================================================

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use serde::Serialize;

// The links found on one page
//
// BTreeSet instead of HashSet only so iteration order is stable between runs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSet {
    pub internal: BTreeSet<String>,
    pub external: BTreeSet<String>,
}

impl LinkSet {
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Extracts all anchor hrefs from HTML content
//
// Example:
//   html = "<a href='book.html'>x</a><a href='https://other.com'>y</a>"
//   internal = {"book.html"}, external = {"https://other.com"}
pub fn extract_links(html: &str) -> LinkSet {
    let mut links = LinkSet::default();

    let document = Html::parse_document(html);

    // The selector is a constant and known to be valid
    let selector = Selector::parse("a[href]").expect("valid anchor selector");

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        if is_external(href) {
            links.external.insert(href.to_string());
        } else {
            links.internal.insert(href.to_string());
        }
    }

    links
}

fn is_external(href: &str) -> bool {
    href.starts_with("http")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_internal_external() {
        let html = r##"
            <a href="book1.html">Book</a>
            <a href="https://www.rust-lang.org">Rust</a>
            <a href="http://plain.example.com/x">Plain</a>
            <a href="#top">Top</a>
        "##;
        let links = extract_links(html);

        assert_eq!(
            links.internal.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["#top", "book1.html"]
        );
        assert_eq!(
            links.external.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["http://plain.example.com/x", "https://www.rust-lang.org"]
        );
    }

    #[test]
    fn test_skip_anchor_without_href() {
        let html = r#"<a name="top">Top</a><a href="">Empty</a><a href="a.html">A</a>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert!(links.internal.contains("a.html"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let html = r#"<a href="a.html">1</a><a href="a.html">2</a>"#;
        let links = extract_links(html);
        assert_eq!(links.internal.len(), 1);
    }

    #[test]
    fn test_every_href_lands_in_exactly_one_set() {
        let hrefs = ["a.html", "/nav/", "https://x.org", "httpish.html", "mailto:me@x.org", "#c"];
        let html: String = hrefs
            .iter()
            .map(|h| format!(r#"<a href="{h}">l</a>"#))
            .collect();
        let links = extract_links(&html);

        assert!(links.internal.is_disjoint(&links.external));
        assert_eq!(links.len(), hrefs.len());
        for href in hrefs {
            assert!(links.internal.contains(href) || links.external.contains(href));
        }
        // "httpish.html" starts with "http", so it counts as external
        assert!(links.external.contains("httpish.html"));
    }

    #[test]
    fn test_no_anchors() {
        assert!(extract_links("<p>nothing here</p>").is_empty());
    }
}
