// src/links/filter.rs
// =============================================================================
// Decides which internal links are books and which are chapters.
//
// On an author page the book links are bare file names ("cuentos.html").
// Site navigation contains '#' or '/', and translated editions end in
// "-en." or "-fr.", so any link containing one of those is dropped.
//
// On a multi-chapter book page, chapter links share the book's slug
// ("cuentos-1.html" for book "cuentos.html").
// =============================================================================

use std::sync::OnceLock;

use regex::Regex;

fn non_book_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Dots are literal: "entrevista-en-madrid.html" is a book, "libro-en.html" is not
    PATTERN.get_or_init(|| Regex::new(r"[#/]|-en\.|-fr\.").expect("valid non-book pattern"))
}

/// Keeps the links that point at a book page, in input order.
pub fn filter_links<I, S>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    links
        .into_iter()
        .filter(|link| !non_book_pattern().is_match(link.as_ref()))
        .map(|link| link.as_ref().to_string())
        .collect()
}

/// Keeps the links containing `root_link`, the book's slug.
pub fn chapter_links<I, S>(links: I, root_link: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    links
        .into_iter()
        .filter(|link| link.as_ref().contains(root_link))
        .map(|link| link.as_ref().to_string())
        .collect()
}
