//! # notelinks
//!
//! Builds the cross-note link graph of a SiYuan markdown export and writes a Hugo "Backlinks"
//! section into every note that something links to.
//!
//! ## Overview
//!
//! Notes reference each other through Hugo `ref` shortcodes:
//!
//! ```markdown
//! See [Simple vs easy]({{< ref "/notes/snippets/Simple vs easy" >}}).
//! ```
//!
//! A run has two phases over the same tree, strictly one after the other:
//!
//! 1. **Extraction** ([`extract::LinkExtractor`]): every note below the export root is scanned for
//!    `ref` shortcodes. Each target is resolved against the filesystem: a directory means its
//!    `_index.md`, anything else must exist with `.md` appended. Resolved references are
//!    appended to a sqlite edge store ([`db::LinkStore`]); broken ones are logged and skipped.
//! 2. **Injection** ([`backlinks::BacklinkInjector`]): for every distinct referenced note, the
//!    distinct referrers are read back from the store and the note's backlinks section is
//!    replaced with one list item per referrer.
//!
//! Re-running on an already processed tree produces the same files: the store is cleared at the
//! start of every run, the old section is found by its heading and replaced, and entries follow
//! first-insertion order from a sorted walk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notelinks::{config::LinkConfig, pipeline::run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LinkConfig::new("./export");
//!     let stats = run(&config).await?;
//!     println!(
//!         "{} edges, {} notes rewritten",
//!         stats.extract.edges_recorded, stats.inject.targets_rewritten
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Module Guide
//!
//! - **[`config`]**: prefixes, heading marker and store location
//! - **[`paths`]**: canonical ⇄ filesystem translation and the [`paths::PathOracle`] seam
//! - **[`refs`]**: `ref` shortcode parsing and rendering
//! - **[`title`]**: front matter titles
//! - **[`db`]**: the edge store
//! - **[`extract`]** / **[`backlinks`]**: the two phases
//! - **[`index_files`]**: `foo.md` → `foo/_index.md` promotion, run before link resolution
//! - **[`pipeline`]**: the full run

pub mod backlinks;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod index_files;
pub mod paths;
pub mod pipeline;
pub mod refs;
#[cfg(test)]
mod tests;
pub mod title;

pub use error::*;
