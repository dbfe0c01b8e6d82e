//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use notelinks::config::LinkConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times. Subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn write_note(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// Create a SiYuan-style export, before index promotion.
///
/// ```text
/// export/
///   Publish.md
///   Publish/
///     snippets.md                 -> Publish/snippets/Simple vs easy
///     snippets/Simple vs easy.md  -> optional notes (directory), ghost
///     optional notes.md           -> snippets/Simple vs easy#why
///     optional notes/App packaging.md -> snippets/Simple vs easy, snippets/Simple vs easy
///   Drafts/wip.md                 -> snippets/Simple vs easy (outside the export root)
/// ```
///
/// Returns the temp dir guard and a config rooted at `export/`, with the link store placed in
/// the temp dir.
#[allow(dead_code)]
pub fn create_test_export(temp_dir: &TempDir) -> LinkConfig {
    let notes_dir = temp_dir.path().join("export");
    write_note(&notes_dir, "Publish.md", "---\ntitle: Notes\n---\n");
    write_note(
        &notes_dir,
        "Publish/snippets.md",
        "---\ntitle: Snippets\n---\n\nStart with [this]({{< ref \"/notes/snippets/Simple vs easy\" >}}).\n",
    );
    write_note(
        &notes_dir,
        "Publish/snippets/Simple vs easy.md",
        r#"---
title: Simple vs easy
---

Related: [optional]({{< ref "/notes/optional notes" >}}).
Dead: [gone]({{< ref "/notes/ghost" >}}).
"#,
    );
    write_note(
        &notes_dir,
        "Publish/optional notes.md",
        "---\ntitle: optional notes\n---\n\n{{< ref \"/notes/snippets/Simple vs easy#why\" >}}\n",
    );
    write_note(
        &notes_dir,
        "Publish/optional notes/App packaging.md",
        "+++\ntitle = \"App packaging\"\n+++\n\n{{< ref \"/notes/snippets/Simple vs easy\" >}} and {{<ref \"/notes/snippets/Simple vs easy\">}}\n",
    );
    write_note(
        &notes_dir,
        "Drafts/wip.md",
        "---\ntitle: WIP\n---\n\n{{< ref \"/notes/snippets/Simple vs easy\" >}}\n",
    );

    let mut config = LinkConfig::new(&notes_dir);
    config.db_path = temp_dir.path().join("logs").join("relations.db");
    config
}
