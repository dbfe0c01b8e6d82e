use crate::error::NotelinksError;
use std::path::Path;

/// Supplies the human-readable title recorded for a referring note.
pub trait TitleResolver {
    /// Never fails: a note without a usable title gets a placeholder naming its path.
    fn resolve_title(&self, path: &Path, content: &str) -> String;
}

/// Reads `title` from YAML (`---`) or TOML (`+++`) front matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterTitles;

impl TitleResolver for FrontmatterTitles {
    fn resolve_title(&self, path: &Path, content: &str) -> String {
        match frontmatter_title(content) {
            Ok(Some(title)) => title,
            Ok(None) => {
                tracing::error!("Unknown title of {:?}", path);
                fallback_title(path)
            }
            Err(e) => {
                tracing::error!("Unreadable front matter in {:?}: {}", path, e);
                fallback_title(path)
            }
        }
    }
}

pub fn fallback_title(path: &Path) -> String {
    format!("Unknown title of {}", path.display())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Yaml,
    Toml,
}

impl Fence {
    fn delimiter(&self) -> &'static str {
        match self {
            Fence::Yaml => "---",
            Fence::Toml => "+++",
        }
    }
}

/// Splits off the front matter block, if the note opens with one.
fn split_frontmatter(content: &str) -> Option<(Fence, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?.trim_end();
    let fence = match first {
        "---" => Fence::Yaml,
        "+++" => Fence::Toml,
        _ => return None,
    };
    let start = content.find('\n')? + 1;
    let mut offset = start;
    for line in lines {
        if line.trim_end() == fence.delimiter() {
            return Some((fence, &content[start..offset]));
        }
        offset += line.len();
    }
    None
}

/// The declared `title`, or `None` when there is no front matter, no `title` key, or the title
/// is blank.
pub fn frontmatter_title(content: &str) -> Result<Option<String>, NotelinksError> {
    let Some((fence, block)) = split_frontmatter(content) else {
        return Ok(None);
    };
    let title = match fence {
        Fence::Yaml => {
            let meta: serde_yaml::Value = serde_yaml::from_str(block)?;
            match meta.get("title") {
                Some(serde_yaml::Value::String(s)) => Some(s.clone()),
                Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
                Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
                _ => None,
            }
        }
        Fence::Toml => {
            let meta: toml::Table = toml::from_str(block)?;
            match meta.get("title") {
                Some(toml::Value::String(s)) => Some(s.clone()),
                Some(toml::Value::Integer(i)) => Some(i.to_string()),
                Some(toml::Value::Float(f)) => Some(f.to_string()),
                _ => None,
            }
        }
    };
    Ok(title.filter(|t| !t.trim().is_empty()))
}
