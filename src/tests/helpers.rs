//! Shared test utilities for link graph testing

use crate::{paths::PathOracle, title::TitleResolver};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// In-memory stand-in for the filesystem. Only the paths registered here exist.
#[derive(Debug, Clone, Default)]
pub struct FakeOracle {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
}

impl FakeOracle {
    pub fn with_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dirs.insert(path.into());
        self
    }

    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.files.insert(path.into());
        self
    }
}

impl PathOracle for FakeOracle {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

/// Gives every note the same title.
pub struct FixedTitles(pub &'static str);

impl TitleResolver for FixedTitles {
    fn resolve_title(&self, _path: &Path, _content: &str) -> String {
        self.0.to_string()
    }
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_note(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
