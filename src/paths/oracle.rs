use std::path::Path;

/// Filesystem state queried while resolving references.
///
/// Whether `{{< ref "/notes/foo" >}}` means `foo/_index.md` or `foo.md` depends on what exists
/// on disk at extraction time, so the extractor asks through this trait instead of touching the
/// filesystem directly.
pub trait PathOracle {
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskOracle;

impl PathOracle for DiskOracle {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<T: PathOracle + ?Sized> PathOracle for &T {
    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }
}
