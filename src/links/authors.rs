// src/links/authors.rs
// =============================================================================
// Reads author keywords from the catalog's root page.
//
// The root page lists authors in table cells with class "lista-libros1";
// each cell holds anchors whose href is the author's keyword (the path
// segment of the author's index page).
// =============================================================================

use scraper::{Html, Selector};

pub fn extract_author_keywords(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("td.lista-libros1 a[href]").expect("valid author selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
