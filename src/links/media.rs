// src/links/media.rs
// =============================================================================
// Finds the audio on a page.
//
// The site embeds audio as <audio><source src="...mp3"></audio>. We return
// every matching src in document order; the caller decides what zero, one,
// or several matches mean.
//
// The match is unanchored: ".mp3" anywhere in the src counts, so
// "clip.mp3x" matches as well.
// =============================================================================

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

fn mp3_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\.mp3").expect("valid mp3 pattern"))
}

// Returns the raw src values of <source> tags pointing at mp3 files
pub fn find_media_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("source[src]").expect("valid source selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .filter(|src| mp3_pattern().is_match(src))
        .map(str::to_string)
        .collect()
}

// Resolves a src against the page it was found on
//
// Absolute srcs are returned untouched. Relative ones are joined onto the
// page URL the way a browser would; if that fails the raw src is kept.
pub fn resolve_media_url(page_url: &str, src: &str) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    match Url::parse(page_url).and_then(|base| base.join(src)) {
        Ok(url) => url.into(),
        Err(_) => src.to_string(),
    }
}
