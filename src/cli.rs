// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option has a default, so running `audiobook-harvester download` with
// no flags downloads the three default authors from albalearning.com into
// the current directory.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::download::{CHAPTER_MEDIA_PREFIX, DEFAULT_AUTHORS, DEFAULT_WEB_ROOT};
use crate::fetch::DEFAULT_PROBE_URL;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "audiobook-harvester",
    version,
    about = "Download the mp3 audiobooks of selected authors from an audiobook catalog",
    long_about = "audiobook-harvester visits each author's page on the catalog, follows the links \
                  to every book (and to every chapter of multi-chapter books) and saves the mp3 \
                  files under one directory per author. Pages with a missing or ambiguous mp3 \
                  are written to a log file instead."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the mp3 files of one or more authors
    ///
    /// Example: audiobook-harvester download --author hesse --output ~/audiolibros
    Download {
        /// Catalog root URL; author pages live at <ROOT><KEYWORD>/
        #[arg(long, default_value = DEFAULT_WEB_ROOT)]
        root: String,

        /// Author keyword, repeat for several authors
        #[arg(long = "author", value_name = "KEYWORD", default_values = DEFAULT_AUTHORS)]
        authors: Vec<String>,

        /// Read the author list from the catalog root page instead of --author
        #[arg(long)]
        discover: bool,

        /// Directory that receives one subdirectory per author
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Anomaly log file (default: <OUTPUT>/log.txt)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Host checked after a failed request to tell a dead page from a dead network
        #[arg(long, default_value = DEFAULT_PROBE_URL)]
        probe_url: String,

        /// Prefix stripped from chapter mp3 names
        #[arg(long, default_value = CHAPTER_MEDIA_PREFIX)]
        chapter_prefix: String,

        /// Print the run report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Hide the progress bars
        #[arg(long)]
        no_progress: bool,
    },

    /// List the author keywords found on the catalog root page
    ///
    /// Example: audiobook-harvester authors --json
    Authors {
        /// Catalog root URL
        #[arg(long, default_value = DEFAULT_WEB_ROOT)]
        root: String,

        /// Host checked after a failed request
        #[arg(long, default_value = DEFAULT_PROBE_URL)]
        probe_url: String,

        /// Output results in JSON format instead of one keyword per line
        #[arg(long)]
        json: bool,
    },
}
