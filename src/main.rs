// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up tracing (diagnostics go to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = clean run, 1 = anomalies logged, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod download; // src/download/ - author/book/chapter walk and file writes
mod fetch; // src/fetch/ - HTTP client and its errors
mod links; // src/links/ - link extraction and filtering

use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use cli::{Cli, Commands};
use download::{discover_authors, AnomalyKind, Downloader, RunReport, Settings};
use fetch::{FetchError, Fetcher};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Parse first so --help works without any logging setup
    let cli = Cli::parse();
    init_tracing(&cli);
    debug!(?cli, "CLI arguments parsed");

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            if e
                .downcast_ref::<FetchError>()
                .is_some_and(FetchError::is_connectivity)
            {
                eprintln!("Check your internet connection and run again.");
            }
            2
        }
    };

    std::process::exit(exit_code);
}

// Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every page had exactly the mp3s we expected
//   Ok(1) = the run finished but anomalies were logged
//   Err = the run was aborted
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Download {
            root,
            authors,
            discover,
            output,
            log_file,
            probe_url,
            chapter_prefix,
            json,
            no_progress,
        } => {
            let fetcher = Fetcher::new(probe_url)?;

            let authors = if discover {
                discover_authors(&fetcher, &root).await?
            } else {
                authors
            };

            let mut settings = Settings::new(output);
            settings.web_root = root;
            settings.chapter_prefix = chapter_prefix;
            settings.show_progress = !no_progress && !json;
            if let Some(log_file) = log_file {
                settings.log_file = log_file;
            }

            handle_download(fetcher, settings, &authors, json).await
        }
        Commands::Authors {
            root,
            probe_url,
            json,
        } => {
            let fetcher = Fetcher::new(probe_url)?;
            handle_authors(&fetcher, &root, json).await
        }
    }
}

async fn handle_download(
    fetcher: Fetcher,
    settings: Settings,
    authors: &[String],
    json: bool,
) -> Result<i32> {
    if authors.is_empty() {
        println!("⚠️  No authors to download");
        return Ok(0);
    }

    if !json {
        println!("🔍 Downloading {} author(s) from {}", authors.len(), settings.web_root);
        println!("📁 Output directory: {}", settings.base_dir.display());
    }
    info!(authors = ?authors, "starting run");

    let downloader = Downloader::new(fetcher, settings);
    let report = downloader.run(authors).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.anomaly_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn handle_authors(fetcher: &Fetcher, root: &str, json: bool) -> Result<i32> {
    let authors = discover_authors(fetcher, root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&authors)?);
    } else {
        for author in &authors {
            println!("{}", author);
        }
    }
    Ok(0)
}

// Prints the run report as a human-readable table
fn print_report(report: &RunReport) {
    println!();
    println!("{:<20} {:>8} {:>8} {:>10}", "AUTHOR", "BOOKS", "FILES", "ANOMALIES");
    println!("{}", "=".repeat(49));

    for author in &report.authors {
        println!(
            "{:<20} {:>8} {:>8} {:>10}",
            author.keyword,
            author.books,
            author.files.len(),
            author.anomalies.len()
        );
    }

    println!();

    let missing = count_kind(report, AnomalyKind::MissingMedia);
    let multiple = count_kind(report, AnomalyKind::MultipleMedia);

    println!("📊 Summary:");
    println!(
        "   ✅ Files written: {} ({} bytes)",
        report.files_written(),
        report.bytes_written()
    );
    println!("   ❓ Chapters without mp3: {}", missing);
    println!("   🔀 Books with several mp3s: {}", multiple);

    if report.anomaly_count() > 0 {
        println!("   📝 See {}", report.log_file.display());
    }
}

fn count_kind(report: &RunReport, kind: AnomalyKind) -> usize {
    report
        .authors
        .iter()
        .flat_map(|a| a.anomalies.iter())
        .filter(|a| a.kind == kind)
        .count()
}
