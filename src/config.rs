use crate::error::NotelinksError;
use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONTENT_PREFIX: &str = "/notes/";
pub const DEFAULT_EXPORT_PREFIX: &str = "Publish";
pub const DEFAULT_BACKLINKS_HEADING: &str = "## Backlinks";
pub const DEFAULT_NOTE_EXTENSION: &str = "md";
pub const DEFAULT_INDEX_FILE: &str = "_index.md";
pub const DEFAULT_LINK_DB: &str = "logs/relations.db";

/// Settings shared by the link extractor and the backlink injector.
///
/// Every field has a default matching a SiYuan export published under Hugo's `content/notes`
/// section, so a config file only needs to name what differs:
///
/// ```toml
/// notes_dir = "export"
/// content_prefix = "/garden/"
/// backlinks_heading = "## Linked from"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Root of the exported note tree.
    pub notes_dir: PathBuf,
    /// Site path that canonical note paths start with. Always ends in `/`.
    pub content_prefix: String,
    /// Directory below `notes_dir` that maps onto `content_prefix`.
    pub export_prefix: String,
    /// Heading line that opens the generated backlinks section.
    pub backlinks_heading: String,
    /// Extension (without dot) of note files.
    pub note_extension: String,
    /// File name standing in for a directory's own content.
    pub index_file: String,
    /// sqlite file holding the edge store. `:memory:` keeps it in process.
    pub db_path: PathBuf,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            notes_dir: PathBuf::from("."),
            content_prefix: DEFAULT_CONTENT_PREFIX.to_string(),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            backlinks_heading: DEFAULT_BACKLINKS_HEADING.to_string(),
            note_extension: DEFAULT_NOTE_EXTENSION.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            db_path: PathBuf::from(DEFAULT_LINK_DB),
        }
    }
}

impl LinkConfig {
    pub fn new<P: AsRef<Path>>(notes_dir: P) -> Self {
        LinkConfig {
            notes_dir: notes_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, NotelinksError> {
        let config: LinkConfig = toml::from_str(content)?;
        config.validated()
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, NotelinksError> {
        tracing::debug!("Reading link config from: {:?}", path.as_ref());
        let content = read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Normalizes separators on the prefixes and rejects values the path translation can't
    /// work with.
    pub fn validated(mut self) -> Result<Self, NotelinksError> {
        let trimmed = self.content_prefix.trim_matches('/');
        self.content_prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self.export_prefix = self.export_prefix.trim_matches('/').to_string();
        self.note_extension = self.note_extension.trim_start_matches('.').to_string();

        if self.note_extension.is_empty() {
            return Err(NotelinksError::Config(
                "note_extension must not be empty".to_string(),
            ));
        }
        if self.backlinks_heading.trim().is_empty() {
            return Err(NotelinksError::Config(
                "backlinks_heading must not be empty".to_string(),
            ));
        }
        if self.index_file.is_empty() || self.index_file.contains('/') {
            return Err(NotelinksError::Config(format!(
                "index_file must be a bare file name, got '{}'",
                self.index_file
            )));
        }
        self.backlinks_heading = self.backlinks_heading.trim().to_string();
        Ok(self)
    }

    /// Directory whose contents are published under `content_prefix`.
    pub fn export_root(&self) -> PathBuf {
        if self.export_prefix.is_empty() {
            self.notes_dir.clone()
        } else {
            self.notes_dir.join(&self.export_prefix)
        }
    }

    /// `.md` for the default extension.
    pub fn note_suffix(&self) -> String {
        format!(".{}", self.note_extension)
    }
}
