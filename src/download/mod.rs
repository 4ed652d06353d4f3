// src/download/mod.rs
// =============================================================================
// This module walks the site and writes mp3 files to disk.
//
// Submodules:
// - naming: URL and file-name conventions of the site
// - anomaly: the append-only anomaly log
// - orchestrator: author -> book -> chapter -> mp3
// =============================================================================

mod anomaly;
mod naming;
mod orchestrator;

pub use anomaly::AnomalyKind;
pub use naming::CHAPTER_MEDIA_PREFIX;
pub use orchestrator::{
    discover_authors, Downloader, RunReport, Settings, DEFAULT_AUTHORS, DEFAULT_WEB_ROOT,
};
