//! Path handling between the exported note tree on disk and the canonical site paths used in
//! Hugo `ref` shortcodes.

pub mod oracle;
pub mod translate;

pub use oracle::{DiskOracle, PathOracle};
pub use translate::{is_hidden, os_path_to_string, strip_anchor, PathTranslator};
