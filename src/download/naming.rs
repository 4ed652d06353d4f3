// src/download/naming.rs
// =============================================================================
// Turns site URLs into URLs and local names.
//
// The site follows fixed naming conventions:
// - author index:   <web_root><keyword>/
// - book page:      <author_root><slug>.html
// - media file:     .../albalearning-<title>.mp3
//
// Every offset the naming depends on is a named constant below.
// =============================================================================

use std::borrow::Cow;
use std::path::{Component, Path};

/// Length of the ".html" extension cut off a book page to get its slug.
pub const HTML_SUFFIX_LEN: usize = 5;

/// Prefix in front of the title in chapter media URLs.
pub const CHAPTER_MEDIA_PREFIX: &str = "/albalearning-";

// Builds the index URL of one author
//
// Example: ("https://albalearning.com/audiolibros/", "hesse")
//          -> "https://albalearning.com/audiolibros/hesse/"
pub fn author_url(web_root: &str, keyword: &str) -> String {
    format!("{web_root}{keyword}/")
}

// Everything up to and including the last '/'
//
// Relative book links are appended to this. Empty when there is no '/'.
pub fn author_root(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[..=index],
        None => "",
    }
}

// Everything after the last '/'
pub fn last_segment(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[index + 1..],
        None => url,
    }
}

// The book's slug: last path segment minus the ".html" extension
//
// This is both the name of the book's subdirectory and the token its chapter
// links contain. Segments shorter than the extension give an empty slug.
pub fn book_slug(url: &str) -> &str {
    let segment = last_segment(url);
    let cut = segment
        .char_indices()
        .rev()
        .nth(HTML_SUFFIX_LEN - 1)
        .map_or(0, |(index, _)| index);
    &segment[..cut]
}

// File name for a chapter's media: the text after `prefix`
//
// `prefix` is matched at the start of the last path segment, with or without
// its leading '/'. When the segment doesn't carry the prefix, the whole
// segment is used.
pub fn strip_known_prefix<'a>(url: &'a str, prefix: &str) -> &'a str {
    let segment = last_segment(url);
    let prefix = prefix.trim_start_matches('/');
    segment.strip_prefix(prefix).unwrap_or(segment)
}

// File name for a terminal book's media: the text after the last '-'
//
// Example: ".../albalearning-la_tregua.mp3" -> "la_tregua.mp3"
pub fn after_last_dash(url: &str) -> &str {
    let segment = last_segment(url);
    match segment.rfind('-') {
        Some(index) => &segment[index + 1..],
        None => segment,
    }
}

// True when `name` is exactly one plain path component
//
// Author keywords and file names are joined onto local directories, so
// "..", absolute paths and nested paths are refused.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// Percent-decodes a file name taken from a URL
//
// Resolved URLs come back encoded ("canci%C3%B3n%20del%20mar.mp3"). The
// encoded text is kept when it doesn't decode to UTF-8 or when the decoded
// text is not a plain file name ("a%2Fb", "%2E%2E").
pub fn decode_file_name(name: &str) -> Cow<'_, str> {
    match urlencoding::decode(name) {
        Ok(decoded) if is_plain_name(&decoded) => decoded,
        _ => Cow::Borrowed(name),
    }
}
