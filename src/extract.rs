use crate::{
    backlinks::strip_backlinks,
    config::LinkConfig,
    db::{Edge, LinkStore},
    error::NotelinksError,
    paths::{is_hidden, PathOracle, PathTranslator},
    refs::extract_references,
    title::TitleResolver,
};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Counters for one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub notes_scanned: usize,
    pub notes_skipped: usize,
    pub edges_recorded: usize,
    pub broken_references: usize,
}

/// Walks the export root and records one edge per resolvable `ref` shortcode.
///
/// Every note is read, each shortcode argument is resolved against the filesystem through the
/// [`PathOracle`], and the resulting edge is written to the store before the next shortcode is
/// looked at. A note that can't be read, or a reference that resolves to nothing, is logged and
/// skipped. Only store failures stop the scan.
pub struct LinkExtractor<O, T> {
    translator: PathTranslator,
    note_extension: String,
    backlinks_heading: String,
    oracle: O,
    titles: T,
}

impl<O: PathOracle, T: TitleResolver> LinkExtractor<O, T> {
    pub fn new(config: &LinkConfig, oracle: O, titles: T) -> Self {
        LinkExtractor {
            translator: PathTranslator::new(config),
            note_extension: config.note_extension.clone(),
            backlinks_heading: config.backlinks_heading.clone(),
            oracle,
            titles,
        }
    }

    /// Note files below the export root, sorted by path. Hidden files and directories are not
    /// visited. Entries that can't be walked are logged and counted in `skipped`.
    pub fn note_files(&self, skipped: &mut usize) -> Vec<PathBuf> {
        let root = self.translator.export_root();
        let mut files = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry below {:?}: {}", root, e);
                    *skipped += 1;
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext == self.note_extension)
                    .unwrap_or(false)
            })
            .collect::<Vec<PathBuf>>();
        files.sort_by(|a, b| a.components().cmp(b.components()));
        files
    }

    /// Scans every note and appends its edges to `store`. The store should be reset first.
    #[tracing::instrument(skip_all, fields(root = ?self.translator.export_root()))]
    pub async fn extract_all(&self, store: &LinkStore) -> Result<ExtractStats, NotelinksError> {
        let mut stats = ExtractStats::default();
        for path in self.note_files(&mut stats.notes_skipped) {
            tracing::info!("Processing {:?} to find Hugo links", path);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Could not read {:?}, skipping: {}", path, e);
                    stats.notes_skipped += 1;
                    continue;
                }
            };
            match self.extract_note(&path, &content, store, &mut stats).await {
                Ok(()) => stats.notes_scanned += 1,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    stats.notes_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            "Link extraction done: {} notes scanned, {} skipped, {} edges, {} broken references",
            stats.notes_scanned,
            stats.notes_skipped,
            stats.edges_recorded,
            stats.broken_references
        );
        Ok(stats)
    }

    /// Records the edges of a single note whose text is `content`.
    ///
    /// A backlinks section left by an earlier run is not scanned; its shortcodes point back at
    /// referrers and would otherwise turn every edge into a pair.
    pub async fn extract_note(
        &self,
        path: &Path,
        content: &str,
        store: &LinkStore,
        stats: &mut ExtractStats,
    ) -> Result<(), NotelinksError> {
        let references = extract_references(strip_backlinks(content, &self.backlinks_heading));
        if references.is_empty() {
            return Ok(());
        }

        let from_path = self.translator.to_canonical(path)?;
        let from_title = self.titles.resolve_title(path, content);

        for reference in references {
            let Some(to_path) = self
                .translator
                .resolve_reference(reference.target, &self.oracle)
            else {
                tracing::warn!(
                    "{:?} seems to have invalid link to \"{}\". Skipping.",
                    path,
                    reference.target
                );
                stats.broken_references += 1;
                continue;
            };

            let edge = Edge {
                from_path: from_path.clone(),
                from_title: from_title.clone(),
                to_path,
            };
            store.insert_edge(&edge).await?;
            tracing::debug!("Recorded link {} -> {}", edge.from_path, edge.to_path);
            stats.edges_recorded += 1;
        }
        Ok(())
    }
}
