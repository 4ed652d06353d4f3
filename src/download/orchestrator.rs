// src/download/orchestrator.rs
// =============================================================================
// This module drives a whole run.
//
// How it works, for every author keyword:
// 1. Fetch the author's index page and keep the internal links that look
//    like books (see links::filter_links)
// 2. Fetch every book page and look for mp3 <source> tags:
//    - exactly one: download it into the author's directory
//    - several: log the page and skip it
//    - none: the book is split in chapters. Create a subdirectory named
//      after the book, follow the chapter links, and download the first
//      mp3 of each chapter (chapters without one are logged)
//
// Everything is sequential. Any fetch, download or filesystem error ends
// the run; only the "wrong number of mp3s" cases are logged and skipped.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::anomaly::{Anomaly, AnomalyLog};
use super::naming::{
    after_last_dash, author_root, author_url, book_slug, decode_file_name, is_plain_name,
    strip_known_prefix, CHAPTER_MEDIA_PREFIX,
};
use crate::fetch::{FetchError, Fetcher};
use crate::links::{
    chapter_links, extract_author_keywords, extract_links, filter_links, find_media_links,
    resolve_media_url,
};

pub const DEFAULT_WEB_ROOT: &str = "https://albalearning.com/audiolibros/";
pub const DEFAULT_AUTHORS: [&str; 3] = ["benedetti", "benavente", "hesse"];

// Everything a run needs to know besides the author list
#[derive(Debug, Clone)]
pub struct Settings {
    /// Catalog root; author index pages live at `<web_root><keyword>/`
    pub web_root: String,
    /// Directory that receives one subdirectory per author
    pub base_dir: PathBuf,
    /// Anomaly log file
    pub log_file: PathBuf,
    /// Prefix stripped from chapter media file names
    pub chapter_prefix: String,
    pub show_progress: bool,
}

impl Settings {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            web_root: DEFAULT_WEB_ROOT.to_string(),
            log_file: base_dir.join("log.txt"),
            base_dir,
            chapter_prefix: CHAPTER_MEDIA_PREFIX.to_string(),
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadedFile {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorReport {
    pub keyword: String,
    pub url: String,
    pub directory: PathBuf,
    /// Number of book links left after filtering
    pub books: usize,
    pub files: Vec<DownloadedFile>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub log_file: PathBuf,
    pub authors: Vec<AuthorReport>,
}

impl RunReport {
    pub fn files_written(&self) -> usize {
        self.authors.iter().map(|a| a.files.len()).sum()
    }

    pub fn bytes_written(&self) -> u64 {
        self.authors
            .iter()
            .flat_map(|a| a.files.iter())
            .map(|f| f.bytes)
            .sum()
    }

    pub fn anomaly_count(&self) -> usize {
        self.authors.iter().map(|a| a.anomalies.len()).sum()
    }
}

pub struct Downloader {
    fetcher: Fetcher,
    log: AnomalyLog,
    settings: Settings,
}

impl Downloader {
    pub fn new(fetcher: Fetcher, settings: Settings) -> Self {
        Self {
            fetcher,
            log: AnomalyLog::new(settings.log_file.clone()),
            settings,
        }
    }

    // Downloads every author in `keywords`, one after the other
    pub async fn run(&self, keywords: &[String]) -> Result<RunReport> {
        let progress = self.multi_progress();
        let authors_bar = progress.add(progress_bar(keywords.len() as u64, "authors"));

        let mut report = RunReport {
            log_file: self.log.path().to_path_buf(),
            authors: Vec::with_capacity(keywords.len()),
        };

        for keyword in keywords {
            // Discovered keywords may carry slashes ("hesse/")
            let keyword = keyword.trim_matches('/');
            // The keyword becomes a directory under base_dir
            if !is_plain_name(keyword) {
                warn!(keyword, "skipping author keyword that is not a plain directory name");
                authors_bar.inc(1);
                continue;
            }
            authors_bar.set_message(keyword.to_string());

            let author = self
                .download_author(keyword, &progress)
                .await
                .with_context(|| format!("failed to download author '{keyword}'"))?;
            report.authors.push(author);

            authors_bar.inc(1);
        }

        authors_bar.finish_and_clear();
        Ok(report)
    }

    async fn download_author(&self, keyword: &str, progress: &MultiProgress) -> Result<AuthorReport> {
        let url = author_url(&self.settings.web_root, keyword);
        let root = author_root(&url).to_string();
        let directory = self.settings.base_dir.join(keyword);
        info!(author = keyword, %url, "processing author");

        let html = self.fetcher.required_page(&url).await?;
        let links = extract_links(&html);
        if links.is_empty() {
            warn!(author = keyword, %url, "author page has no links");
        }
        let books = filter_links(&links.internal);
        debug!(author = keyword, links = links.len(), books = books.len(), "book links after filtering");

        tokio::fs::create_dir_all(&directory)
            .await
            .with_context(|| format!("failed to create {}", directory.display()))?;

        let mut report = AuthorReport {
            keyword: keyword.to_string(),
            url: url.clone(),
            directory: directory.clone(),
            books: books.len(),
            files: Vec::new(),
            anomalies: Vec::new(),
        };

        let bar = progress.add(progress_bar(books.len() as u64, "books"));
        for link in &books {
            bar.set_message(link.clone());
            let book_url = format!("{root}{link}");
            self.process_book(&root, &book_url, &directory, &mut report).await?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        progress.remove(&bar);

        Ok(report)
    }

    async fn process_book(
        &self,
        author_root: &str,
        book_url: &str,
        author_dir: &Path,
        report: &mut AuthorReport,
    ) -> Result<()> {
        let html = self.fetcher.page(book_url).await?;
        let media = media_on_page(book_url, &html);

        match media.as_slice() {
            [] => {
                self.process_chapters(author_root, book_url, &html, author_dir, report)
                    .await
            }
            [single] => {
                let dest = author_dir.join(decode_file_name(after_last_dash(single)).as_ref());
                self.save(single, dest, report).await
            }
            _ => {
                warn!(url = book_url, found = media.len(), "more than one mp3 on book page, skipping");
                self.record(Anomaly::multiple_media(book_url), report).await
            }
        }
    }

    // A book without its own mp3: every chapter page gets one
    async fn process_chapters(
        &self,
        author_root: &str,
        book_url: &str,
        book_html: &str,
        author_dir: &Path,
        report: &mut AuthorReport,
    ) -> Result<()> {
        if book_html.is_empty() {
            return Err(FetchError::Retrieval {
                url: book_url.to_string(),
            }
            .into());
        }

        let slug = book_slug(book_url);
        let book_dir = author_dir.join(slug);
        tokio::fs::create_dir_all(&book_dir)
            .await
            .with_context(|| format!("failed to create {}", book_dir.display()))?;

        let chapters = chapter_links(&extract_links(book_html).internal, slug);
        debug!(book = book_url, chapters = chapters.len(), "resolved chapter pages");

        for link in &chapters {
            let chapter_url = format!("{author_root}{link}");
            let html = self.fetcher.page(&chapter_url).await?;
            let media = media_on_page(&chapter_url, &html);

            let Some(first) = media.first() else {
                warn!(url = %chapter_url, "no mp3 on chapter page");
                self.record(Anomaly::missing_media(&chapter_url), report).await?;
                continue;
            };

            let name = strip_known_prefix(first, &self.settings.chapter_prefix);
            let dest = book_dir.join(decode_file_name(name).as_ref());
            self.save(first, dest, report).await?;
        }

        Ok(())
    }

    async fn save(&self, url: &str, dest: PathBuf, report: &mut AuthorReport) -> Result<()> {
        let bytes = self.fetcher.download(url, &dest).await?;
        info!(url, path = %dest.display(), bytes, "saved");

        report.files.push(DownloadedFile {
            url: url.to_string(),
            path: dest,
            bytes,
        });
        Ok(())
    }

    async fn record(&self, anomaly: Anomaly, report: &mut AuthorReport) -> Result<()> {
        self.log.append(&anomaly).await?;
        report.anomalies.push(anomaly);
        Ok(())
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.settings.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }
}

// Reads the author keywords listed on the catalog root page
pub async fn discover_authors(fetcher: &Fetcher, web_root: &str) -> Result<Vec<String>> {
    let html = fetcher.required_page(web_root).await?;
    Ok(extract_author_keywords(&html))
}

// mp3 sources of a page, resolved to absolute URLs
fn media_on_page(page_url: &str, html: &str) -> Vec<String> {
    find_media_links(html)
        .iter()
        .map(|src| resolve_media_url(page_url, src))
        .collect()
}

fn progress_bar(len: u64, prefix: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template("{prefix:>8} [{bar:40}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len).with_style(style).with_prefix(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::anomaly::AnomalyKind;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, body: impl Into<Vec<u8>>) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
            .mount(server)
            .await;
    }

    fn downloader(server: &MockServer, dir: &TempDir) -> Downloader {
        let mut settings = Settings::new(dir.path());
        settings.web_root = format!("{}/audiolibros/", server.uri());
        let fetcher = Fetcher::new(format!("{}/probe", server.uri())).unwrap();
        Downloader::new(fetcher, settings)
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    fn log_entries(dir: &TempDir) -> usize {
        std::fs::read_to_string(dir.path().join("log.txt"))
            .map(|log| log.matches("Logged time: ").count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_full_author_run() {
        let server = MockServer::start().await;
        let uri = server.uri();

        mount(
            &server,
            "/audiolibros/benedetti/",
            r##"
            <a href="#top">Top</a>
            <a href="/audiolibros/">Audiolibros</a>
            <a href="la_tregua.html">La tregua</a>
            <a href="la_tregua-en.html">The truce</a>
            <a href="versiones.html">Versiones</a>
            <a href="cuentos.html">Cuentos</a>
            <a href="https://twitter.com/albalearning">Twitter</a>
            "##,
        )
        .await;
        mount(
            &server,
            "/audiolibros/benedetti/la_tregua.html",
            format!(r#"<audio><source src="{uri}/mp3/albalearning-la_tregua.mp3" type="audio/mpeg"></audio>"#),
        )
        .await;
        mount(
            &server,
            "/audiolibros/benedetti/versiones.html",
            format!(
                r#"<source src="{uri}/mp3/albalearning-lenta.mp3"><source src="{uri}/mp3/albalearning-rapida.mp3">"#
            ),
        )
        .await;
        mount(
            &server,
            "/audiolibros/benedetti/cuentos.html",
            r#"
            <a href="cuentos-1.html">Uno</a>
            <a href="cuentos-2.html">Dos</a>
            <a href="../index.html">Inicio</a>
            <a href="otros.html">Otros</a>
            "#,
        )
        .await;
        mount(
            &server,
            "/audiolibros/benedetti/cuentos-1.html",
            r#"<audio><source src="/mp3/albalearning-cuentos-uno.mp3"></audio>"#,
        )
        .await;
        mount(&server, "/audiolibros/benedetti/cuentos-2.html", "<p>Pronto</p>").await;
        mount(&server, "/mp3/albalearning-la_tregua.mp3", b"tregua-bytes".to_vec()).await;
        mount(&server, "/mp3/albalearning-cuentos-uno.mp3", b"uno-bytes".to_vec()).await;

        let dir = TempDir::new().unwrap();
        let report = downloader(&server, &dir)
            .run(&keywords(&["benedetti"]))
            .await
            .unwrap();

        assert_eq!(report.authors.len(), 1);
        let author = &report.authors[0];
        assert_eq!(author.books, 3);
        assert_eq!(report.files_written(), 2);
        assert_eq!(report.bytes_written(), 21);

        let author_dir = dir.path().join("benedetti");
        assert_eq!(std::fs::read(author_dir.join("la_tregua.mp3")).unwrap(), b"tregua-bytes");
        assert_eq!(
            std::fs::read(author_dir.join("cuentos").join("cuentos-uno.mp3")).unwrap(),
            b"uno-bytes"
        );
        // la_tregua.mp3 and the cuentos/ directory, nothing for versiones.html
        assert_eq!(std::fs::read_dir(&author_dir).unwrap().count(), 2);

        assert_eq!(report.anomaly_count(), 2);
        assert!(author.anomalies.iter().any(|a| a.kind == AnomalyKind::MultipleMedia
            && a.url.ends_with("/benedetti/versiones.html")));
        assert!(author.anomalies.iter().any(|a| a.kind == AnomalyKind::MissingMedia
            && a.url.ends_with("/benedetti/cuentos-2.html")));
        assert_eq!(log_entries(&dir), 2);
    }

    #[tokio::test]
    async fn test_multiple_media_skips_download_and_logs_once() {
        let server = MockServer::start().await;
        let uri = server.uri();

        mount(&server, "/audiolibros/hesse/", r#"<a href="siddhartha.html">S</a>"#).await;
        mount(
            &server,
            "/audiolibros/hesse/siddhartha.html",
            format!(r#"<source src="{uri}/mp3/a.mp3"><source src="{uri}/mp3/b.mp3">"#),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let report = downloader(&server, &dir)
            .run(&keywords(&["hesse"]))
            .await
            .unwrap();

        assert_eq!(report.files_written(), 0);
        assert_eq!(log_entries(&dir), 1);
        assert_eq!(std::fs::read_dir(dir.path().join("hesse")).unwrap().count(), 0);
        // No mp3 was requested
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().starts_with("/mp3/")));
    }

    #[tokio::test]
    async fn test_discovered_keyword_slashes_are_trimmed() {
        let server = MockServer::start().await;
        mount(&server, "/audiolibros/benavente/", r#"<a href="/audiolibros/">Volver</a>"#).await;

        let dir = TempDir::new().unwrap();
        let report = downloader(&server, &dir)
            .run(&keywords(&["benavente/"]))
            .await
            .unwrap();

        assert_eq!(report.authors[0].keyword, "benavente");
        assert_eq!(report.authors[0].books, 0);
        assert!(dir.path().join("benavente").is_dir());
    }

    #[tokio::test]
    async fn test_keyword_outside_output_dir_is_skipped() {
        let server = MockServer::start().await;
        mount(&server, "/audiolibros/benedetti/", r#"<a href="/audiolibros/">Volver</a>"#).await;
        mount(&server, "/audiolibros/escaped/", r#"<a href="/audiolibros/">Volver</a>"#).await;

        let dir = TempDir::new().unwrap();
        let mut settings = Settings::new(dir.path().join("out"));
        settings.web_root = format!("{}/audiolibros/", server.uri());
        let fetcher = Fetcher::new(format!("{}/probe", server.uri())).unwrap();
        let report = Downloader::new(fetcher, settings)
            .run(&keywords(&["../escaped", "..", "benedetti"]))
            .await
            .unwrap();

        assert_eq!(report.authors.len(), 1);
        assert_eq!(report.authors[0].keyword, "benedetti");
        assert!(dir.path().join("out").join("benedetti").is_dir());
        assert!(!dir.path().join("escaped").exists());
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.path().contains("escaped")));
    }

    #[tokio::test]
    async fn test_percent_encoded_media_names_are_decoded() {
        let server = MockServer::start().await;
        let uri = server.uri();

        mount(&server, "/audiolibros/hesse/", r#"<a href="mar.html">M</a><a href="viaje.html">V</a>"#).await;
        mount(
            &server,
            "/audiolibros/hesse/mar.html",
            r#"<source src="/m/albalearning-canción del mar.mp3">"#,
        )
        .await;
        mount(&server, "/audiolibros/hesse/viaje.html", r#"<a href="viaje-1.html">1</a>"#).await;
        mount(
            &server,
            "/audiolibros/hesse/viaje-1.html",
            format!(r#"<source src="{uri}/m/albalearning-capítulo%20uno.mp3">"#),
        )
        .await;
        mount(&server, "/m/albalearning-canci%C3%B3n%20del%20mar.mp3", b"mar".to_vec()).await;
        mount(&server, "/m/albalearning-cap%C3%ADtulo%20uno.mp3", b"uno".to_vec()).await;

        let dir = TempDir::new().unwrap();
        let report = downloader(&server, &dir)
            .run(&keywords(&["hesse"]))
            .await
            .unwrap();

        assert_eq!(report.files_written(), 2);
        let author_dir = dir.path().join("hesse");
        assert_eq!(std::fs::read(author_dir.join("canción del mar.mp3")).unwrap(), b"mar");
        assert_eq!(
            std::fs::read(author_dir.join("viaje").join("capítulo uno.mp3")).unwrap(),
            b"uno"
        );
    }

    #[tokio::test]
    async fn test_empty_author_page_aborts_run() {
        let server = MockServer::start().await;
        mount(&server, "/audiolibros/benedetti/", "").await;

        let dir = TempDir::new().unwrap();
        let err = downloader(&server, &dir)
            .run(&keywords(&["benedetti"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Retrieval { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_download_aborts_run() {
        let server = MockServer::start().await;
        let uri = server.uri();

        mount(&server, "/audiolibros/hesse/", r#"<a href="demian.html">D</a><a href="lobo.html">L</a>"#).await;
        mount(
            &server,
            "/audiolibros/hesse/demian.html",
            format!(r#"<source src="{uri}/mp3/albalearning-demian.mp3">"#),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let err = downloader(&server, &dir)
            .run(&keywords(&["hesse"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Status { status: 404, .. })
        ));
        // The run stopped before reaching the second book
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/audiolibros/hesse/lobo.html"));
    }

    #[tokio::test]
    async fn test_discover_authors() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/audiolibros/",
            r#"<table><tr>
                <td class="lista-libros1"><a href="benedetti">Benedetti</a></td>
                <td class="lista-libros1"><a href="hesse">Hesse</a></td>
            </tr></table>"#,
        )
        .await;

        let fetcher = Fetcher::new(server.uri()).unwrap();
        let authors = discover_authors(&fetcher, &format!("{}/audiolibros/", server.uri()))
            .await
            .unwrap();
        assert_eq!(authors, vec!["benedetti", "hesse"]);
    }
}
