use crate::{config::LinkConfig, error::NotelinksError, paths::PathOracle};
use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};
use walkdir::DirEntry;

/// Utility function to replace separators and convert to unicode (via to_string_lossy) on os path.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    os_path_ref
        .as_ref()
        .components()
        .filter_map(|c| match c {
            Component::RootDir | Component::CurDir => None,
            _ => Some(c.as_os_str().to_string_lossy()),
        })
        .collect::<Vec<Cow<'_, str>>>()
        .join("/")
}

/// Dot-files and dot-directories, which the walks below the notes dir never enter.
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Drops a trailing `#fragment`. Only the last `#` counts, so `a#b#c` keeps `a#b`.
pub fn strip_anchor(target: &str) -> &str {
    target
        .rsplit_once('#')
        .map(|(path, _anchor)| path)
        .unwrap_or(target)
}

/// Two-way mapping between files below the export root and canonical site paths.
///
/// With the default config, `<notes_dir>/Publish/snippets/Simple vs easy.md` and
/// `/notes/snippets/Simple vs easy.md` name the same note.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    export_root: PathBuf,
    content_prefix: String,
    note_suffix: String,
    index_file: String,
}

impl PathTranslator {
    pub fn new(config: &LinkConfig) -> Self {
        PathTranslator {
            export_root: config.export_root(),
            content_prefix: config.content_prefix.clone(),
            note_suffix: config.note_suffix(),
            index_file: config.index_file.clone(),
        }
    }

    pub fn export_root(&self) -> &Path {
        &self.export_root
    }

    pub fn is_note(&self, canonical: &str) -> bool {
        canonical.ends_with(&self.note_suffix)
    }

    pub fn is_index(&self, canonical: &str) -> bool {
        canonical == self.index_file || canonical.ends_with(&format!("/{}", self.index_file))
    }

    /// Canonical site path of a note file. Fails if the file is not below the export root.
    pub fn to_canonical(&self, fs_path: &Path) -> Result<String, NotelinksError> {
        let relative = fs_path.strip_prefix(&self.export_root)?;
        Ok(format!(
            "{}{}",
            self.content_prefix,
            os_path_to_string(relative)
        ))
    }

    /// Filesystem location of a canonical path. Paths missing the content prefix are taken as
    /// relative to the export root.
    ///
    /// Empty and `.` segments are dropped, so the result always lies below the export root. A
    /// `..` segment, or one that is not a plain file name, is a `NotFound` error.
    pub fn to_fs(&self, canonical: &str) -> Result<PathBuf, NotelinksError> {
        let relative = if canonical == self.content_prefix.trim_end_matches('/') {
            ""
        } else {
            canonical
                .strip_prefix(&self.content_prefix)
                .unwrap_or(canonical)
        };
        let mut fs_path = self.export_root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => fs_path.push(name),
                _ => {
                    return Err(NotelinksError::NotFound(format!(
                        "{canonical} points outside the export root"
                    )))
                }
            }
        }
        Ok(fs_path)
    }

    /// Resolves the argument of a `ref` shortcode to the canonical path of the note it names.
    ///
    /// A target naming a directory with an index file resolves to that index file; otherwise the
    /// note extension is appended and the file must exist. The result is rebuilt from the file
    /// found on disk, so every spelling of a note (with or without the content prefix, doubled
    /// or trailing separators) yields the same path. Returns `None` for anything else, including
    /// an empty target (a bare `#anchor`) and targets that leave the export root.
    pub fn resolve_reference<O: PathOracle>(&self, raw_target: &str, oracle: &O) -> Option<String> {
        let target = strip_anchor(raw_target).trim();
        let target = if target.len() > 1 {
            target.trim_end_matches('/')
        } else {
            target
        };
        if target.is_empty() {
            return None;
        }

        let fs_target = self.to_fs(target).ok()?;
        if oracle.is_dir(&fs_target) {
            let index = fs_target.join(&self.index_file);
            if oracle.is_file(&index) {
                return self.to_canonical(&index).ok();
            }
            tracing::debug!("{:?} has no {}, trying the leaf note", fs_target, self.index_file);
        }

        let mut leaf = fs_target.into_os_string();
        leaf.push(&self.note_suffix);
        let leaf = PathBuf::from(leaf);
        if oracle.is_file(&leaf) {
            return self.to_canonical(&leaf).ok();
        }
        None
    }

    /// Argument to use in a `ref` shortcode pointing at `canonical`.
    ///
    /// Hugo refuses refs to `_index.md` files, so index notes are referenced through their
    /// directory. Leaf notes drop the extension.
    pub fn ref_target<'a>(&self, canonical: &'a str) -> &'a str {
        if self.is_index(canonical) {
            canonical
                .rsplit_once('/')
                .map(|(dir, _index)| dir)
                .unwrap_or("")
        } else {
            canonical
                .strip_suffix(&self.note_suffix)
                .unwrap_or(canonical)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::FakeOracle;
    use test_log::test;

    fn translator() -> PathTranslator {
        PathTranslator::new(&LinkConfig::new("/export"))
    }

    #[test]
    fn canonical_round_trip_through_export_root() {
        let tr = translator();
        let fs_path = PathBuf::from("/export/Publish/snippets/Simple vs easy.md");
        let canonical = tr.to_canonical(&fs_path).unwrap();
        assert_eq!(canonical, "/notes/snippets/Simple vs easy.md");
        assert_eq!(tr.to_fs(&canonical).unwrap(), fs_path);
    }

    #[test]
    fn files_outside_export_root_have_no_canonical_path() {
        let tr = translator();
        let err = tr
            .to_canonical(Path::new("/export/Drafts/idea.md"))
            .unwrap_err();
        assert!(matches!(err, NotelinksError::NotFound(_)));
    }

    #[test]
    fn anchors_split_on_last_hash() {
        assert_eq!(strip_anchor("/notes/a#intro"), "/notes/a");
        assert_eq!(strip_anchor("/notes/c#sharp#notes"), "/notes/c#sharp");
        assert_eq!(strip_anchor("/notes/a"), "/notes/a");
        assert_eq!(strip_anchor("#local"), "");
    }

    #[test]
    fn directory_targets_resolve_to_index() {
        let tr = translator();
        let oracle = FakeOracle::default()
            .with_dir("/export/Publish/topics")
            .with_file("/export/Publish/topics/_index.md");
        assert_eq!(
            tr.resolve_reference("/notes/topics", &oracle).as_deref(),
            Some("/notes/topics/_index.md")
        );
        assert_eq!(
            tr.resolve_reference("/notes/topics/#section", &oracle)
                .as_deref(),
            Some("/notes/topics/_index.md")
        );
    }

    #[test]
    fn leaf_targets_gain_extension() {
        let tr = translator();
        let oracle = FakeOracle::default().with_file("/export/Publish/topics/rust.md");
        assert_eq!(
            tr.resolve_reference("/notes/topics/rust#ownership", &oracle)
                .as_deref(),
            Some("/notes/topics/rust.md")
        );
    }

    #[test]
    fn directory_wins_over_same_named_leaf() {
        let tr = translator();
        let oracle = FakeOracle::default()
            .with_dir("/export/Publish/topics")
            .with_file("/export/Publish/topics/_index.md")
            .with_file("/export/Publish/topics.md");
        assert_eq!(
            tr.resolve_reference("/notes/topics", &oracle).as_deref(),
            Some("/notes/topics/_index.md")
        );
    }

    #[test]
    fn content_prefix_itself_names_the_export_root() {
        let tr = translator();
        assert_eq!(tr.to_fs("/notes").unwrap(), PathBuf::from("/export/Publish"));
        let oracle = FakeOracle::default()
            .with_dir("/export/Publish")
            .with_file("/export/Publish/_index.md");
        assert_eq!(
            tr.resolve_reference("/notes/", &oracle).as_deref(),
            Some("/notes/_index.md")
        );
    }

    #[test]
    fn missing_and_empty_targets_do_not_resolve() {
        let tr = translator();
        let oracle = FakeOracle::default();
        assert_eq!(tr.resolve_reference("/notes/ghost", &oracle), None);
        assert_eq!(tr.resolve_reference("#top", &oracle), None);
        assert_eq!(tr.resolve_reference("  ", &oracle), None);
    }

    #[test]
    fn directory_without_index_falls_back_to_leaf() {
        let tr = translator();
        let oracle = FakeOracle::default()
            .with_dir("/export/Publish/orphans")
            .with_file("/export/Publish/orphans/leaf.md");
        assert_eq!(tr.resolve_reference("/notes/orphans", &oracle), None);

        let oracle = oracle.with_file("/export/Publish/orphans.md");
        assert_eq!(
            tr.resolve_reference("/notes/orphans", &oracle).as_deref(),
            Some("/notes/orphans.md")
        );
    }

    #[test]
    fn every_spelling_resolves_to_one_canonical_path() {
        let tr = translator();
        let oracle = FakeOracle::default()
            .with_dir("/export/Publish/topics")
            .with_file("/export/Publish/topics/_index.md")
            .with_file("/export/Publish/topics/rust.md");
        for spelling in [
            "/notes/topics/rust",
            "topics/rust",
            "/topics/rust",
            "/notes//topics/./rust",
            "topics/rust#borrowing",
        ] {
            assert_eq!(
                tr.resolve_reference(spelling, &oracle).as_deref(),
                Some("/notes/topics/rust.md"),
                "{spelling}"
            );
        }
        assert_eq!(
            tr.resolve_reference("topics/", &oracle).as_deref(),
            Some("/notes/topics/_index.md")
        );
    }

    #[test]
    fn targets_never_leave_the_export_root() {
        let tr = translator();
        assert_eq!(
            tr.to_fs("/notes//tmp/victim").unwrap(),
            PathBuf::from("/export/Publish/tmp/victim")
        );
        assert!(matches!(
            tr.to_fs("/notes/../Drafts/idea"),
            Err(NotelinksError::NotFound(_))
        ));
        assert!(tr.to_fs("/notes/topics/../../secret").is_err());

        let oracle = FakeOracle::default()
            .with_file("/tmp/victim.md")
            .with_file("/export/Drafts/idea.md");
        assert_eq!(tr.resolve_reference("/notes//tmp/victim", &oracle), None);
        assert_eq!(tr.resolve_reference("/notes/../Drafts/idea", &oracle), None);
    }

    #[test]
    fn ref_targets_hide_index_files_and_extensions() {
        let tr = translator();
        assert_eq!(tr.ref_target("/notes/topics/_index.md"), "/notes/topics");
        assert_eq!(tr.ref_target("/notes/_index.md"), "/notes");
        assert_eq!(tr.ref_target("/notes/topics/rust.md"), "/notes/topics/rust");
        assert_eq!(tr.ref_target("/notes/my_index.md"), "/notes/my_index");
    }
}
