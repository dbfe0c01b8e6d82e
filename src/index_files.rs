//! Directory-to-index promotion.
//!
//! SiYuan exports a note that has children as both `foo.md` and a directory `foo/`. Hugo wants
//! the parent's content in `foo/_index.md`, and the link resolver relies on that layout when it
//! maps a directory reference onto its index file.

use crate::{config::LinkConfig, error::NotelinksError, paths::is_hidden};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoteStats {
    pub promoted: usize,
    pub conflicts: usize,
    pub directories_without_index: Vec<PathBuf>,
}

/// `(from, to)` for every note that has a same-named sibling directory. Hidden entries are
/// ignored.
pub fn promotion_candidates(root: &Path, config: &LinkConfig) -> Vec<(PathBuf, PathBuf)> {
    let suffix = config.note_suffix();
    let mut moves = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry below {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?;
            let stem = name.strip_suffix(&suffix)?;
            if stem.is_empty() {
                return None;
            }
            let dir = entry.path().with_file_name(stem);
            dir.is_dir()
                .then(|| (entry.path().to_path_buf(), dir.join(&config.index_file)))
        })
        .collect::<Vec<_>>();
    moves.sort();
    moves
}

/// Moves each `foo.md` with a sibling `foo/` to `foo/_index.md`, then reports every directory
/// below `notes_dir` that still has no index file.
#[tracing::instrument(skip_all, fields(root = ?config.notes_dir))]
pub fn promote_index_files(config: &LinkConfig) -> Result<PromoteStats, NotelinksError> {
    let root = config.notes_dir.as_path();
    if !root.is_dir() {
        return Err(NotelinksError::NotFound(format!(
            "The notes dir {} does not exist",
            root.display()
        )));
    }
    tracing::info!("Creating index files");
    let mut stats = PromoteStats::default();

    for (from, to) in promotion_candidates(root, config) {
        if to.exists() {
            tracing::warn!(
                "Not moving {:?}: {:?} already exists",
                from,
                to
            );
            stats.conflicts += 1;
            continue;
        }
        tracing::info!("Moving {:?} to {:?}", from, to);
        std::fs::rename(&from, &to)?;
        stats.promoted += 1;
    }

    stats.directories_without_index = directories_without_index(root, &config.index_file);
    for dir in &stats.directories_without_index {
        tracing::error!("Directory {:?} does not have an {} file.", dir, config.index_file);
    }
    Ok(stats)
}

/// Directories strictly below `root` lacking `index_file`. Hidden directories are ignored.
pub fn directories_without_index(root: &Path, index_file: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|dir| !dir.join(index_file).is_file())
        .collect()
}
