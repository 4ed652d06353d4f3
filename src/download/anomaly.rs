// src/download/anomaly.rs
// =============================================================================
// The anomaly log: a plain text file that collects every page where we
// expected exactly one mp3 and found something else.
//
// Entry layout:
//
//   Logged time: 18/10/2026, 14:03:59
//   WARNING: The new_link: "https://.../cuentos-2.html"
//   Very likely the website of this link has several chapters or a link is wrong!
//   <blank line>
//
// The file is opened in append mode for every entry.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A chapter page without any mp3 source
    MissingMedia,
    /// A book page with more than one mp3 source
    MultipleMedia,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub url: String,
}

impl Anomaly {
    pub fn missing_media(url: impl Into<String>) -> Self {
        Self {
            kind: AnomalyKind::MissingMedia,
            url: url.into(),
        }
    }

    pub fn multiple_media(url: impl Into<String>) -> Self {
        Self {
            kind: AnomalyKind::MultipleMedia,
            url: url.into(),
        }
    }

    pub fn warning(&self) -> String {
        match self.kind {
            // Same wording as log files written by earlier versions
            AnomalyKind::MissingMedia => format!("The new_link: \"{}\"", self.url),
            AnomalyKind::MultipleMedia => {
                format!("More than one mp3 file have been found on: \"{}\"", self.url)
            }
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self.kind {
            AnomalyKind::MissingMedia => {
                "Very likely the website of this link has several chapters or a link is wrong!"
            }
            AnomalyKind::MultipleMedia => {
                "Very likely the website of this link has several versions."
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyLog {
    path: PathBuf,
}

impl AnomalyLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Appends one entry stamped with the current local time
    pub async fn append(&self, anomaly: &Anomaly) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let entry = render(anomaly, &timestamp);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;

        file.write_all(entry.as_bytes())
            .await
            .with_context(|| format!("failed to write log file {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

fn render(anomaly: &Anomaly, timestamp: &str) -> String {
    format!(
        "Logged time: {timestamp}\nWARNING: {}\n{}\n\n",
        anomaly.warning(),
        anomaly.explanation()
    )
}
