use crate::{
    config::LinkConfig,
    db::{Backlink, LinkStore},
    error::NotelinksError,
    paths::PathTranslator,
    refs::render_ref_link,
};
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;

/// Counters for one injection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectStats {
    pub targets_rewritten: usize,
    pub backlinks_written: usize,
    pub targets_failed: usize,
}

/// The part of `content` before the last `heading`, or all of it if the heading is absent.
pub fn strip_backlinks<'a>(content: &'a str, heading: &str) -> &'a str {
    match content.rfind(heading) {
        Some(idx) => &content[..idx],
        None => content,
    }
}

/// Replaces everything from the last `heading` onwards with a fresh backlinks section.
///
/// Text before the heading is kept, minus trailing whitespace. If `heading` does not occur the
/// whole content is kept. Each entry becomes one list item. Feeding the output back in with the
/// same entries returns it unchanged.
pub fn splice_backlinks(content: &str, heading: &str, entries: &[String]) -> String {
    let body = strip_backlinks(content, heading);
    let mut out = String::with_capacity(body.len() + heading.len() + entries.len() * 64);
    out.push_str(body.trim_end());
    out.push_str("\n\n");
    out.push_str(heading);
    out.push('\n');
    for entry in entries {
        out.push_str("\n- ");
        out.push_str(entry);
    }
    out
}

/// Writes `content` to `path` by way of a temporary file in the same directory, so a crash
/// leaves either the old or the new file, never a truncated one.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), NotelinksError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = std::fs::metadata(path).ok().map(|m| m.permissions());
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path)?;
    Ok(())
}

/// Rewrites every referenced note with a backlinks section built from the edge store.
pub struct BacklinkInjector {
    translator: PathTranslator,
    heading: String,
}

impl BacklinkInjector {
    pub fn new(config: &LinkConfig) -> Self {
        BacklinkInjector {
            translator: PathTranslator::new(config),
            heading: config.backlinks_heading.clone(),
        }
    }

    /// List item text for one referrer.
    pub fn render_entry(&self, backlink: &Backlink) -> String {
        render_ref_link(
            &backlink.from_title,
            self.translator.ref_target(&backlink.from_path),
        )
    }

    /// Visits each distinct target in the store in first-reference order. Targets that aren't
    /// notes are ignored; targets that can't be read or written are logged and counted.
    #[tracing::instrument(skip_all, fields(root = ?self.translator.export_root()))]
    pub async fn inject_all(&self, store: &LinkStore) -> Result<InjectStats, NotelinksError> {
        let mut stats = InjectStats::default();
        for target in store.distinct_targets().await? {
            if !self.translator.is_note(&target) {
                tracing::debug!("Not a note, no backlinks added: {}", target);
                continue;
            }
            tracing::info!("Processing file {} for adding backlinks", target);
            let backlinks = store.backlinks_for(&target).await?;
            match self.inject(&target, &backlinks).await {
                Ok(()) => {
                    stats.targets_rewritten += 1;
                    stats.backlinks_written += backlinks.len();
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Could not add backlinks to {}: {}", target, e);
                    stats.targets_failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            "Backlink injection done: {} notes rewritten, {} backlinks, {} failures",
            stats.targets_rewritten,
            stats.backlinks_written,
            stats.targets_failed
        );
        Ok(stats)
    }

    /// Rewrites the note at canonical path `target`. Always writes, even if nothing changed.
    pub async fn inject(&self, target: &str, backlinks: &[Backlink]) -> Result<(), NotelinksError> {
        let path = self.translator.to_fs(target)?;
        let content = tokio::fs::read_to_string(&path).await?;
        let entries = backlinks
            .iter()
            .map(|backlink| {
                let entry = self.render_entry(backlink);
                tracing::info!("Adding backlink {} to {:?}", entry, path);
                entry
            })
            .collect::<Vec<String>>();
        let updated = splice_backlinks(&content, &self.heading, &entries);
        write_atomically(&path, &updated)
    }
}
