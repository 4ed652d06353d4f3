// src/links/mod.rs
// =============================================================================
// This module contains all HTML link logic. Nothing in here touches the
// network: every function takes HTML (or link strings) and returns links.
//
// Submodules:
// - extract: Splits <a href> values into internal and external sets
// - filter: Drops navigation and foreign-language links, picks chapter links
// - media: Finds mp3 sources inside <source> tags
// - authors: Reads author keywords from the catalog's root page
// =============================================================================

mod authors;
mod extract;
mod filter;
mod media;

pub use authors::extract_author_keywords;
pub use extract::extract_links;
pub use filter::{chapter_links, filter_links};
pub use media::{find_media_links, resolve_media_url};
