// src/fetch/mod.rs
// =============================================================================
// This module talks to the network.
//
// Submodules:
// - client: the Fetcher (page HTML, media downloads, connectivity probe)
// - error: the FetchError enum every fetch returns
//
// Rust concepts:
// - Modules: Organize code into namespaces
// - pub use: Re-export items to simplify imports for users of this module
// =============================================================================

mod client;
mod error;

pub use client::{Fetcher, DEFAULT_PROBE_URL};
pub use error::FetchError;
