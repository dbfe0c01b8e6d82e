//! Hugo `ref` shortcodes: finding them in note text and rendering new ones.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `{{< ref "path" >}}`, capturing everything between `ref` and the closing `>}}`.
/// Spacing inside the delimiters is free-form.
static REF_SHORTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\{<\s*ref\s+(.*?)\s*>\}\}"#).expect("ref shortcode pattern is valid")
});

/// One `ref` shortcode found in a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference<'a> {
    /// The whole shortcode as written.
    pub marker: &'a str,
    /// The argument with padding and quotes removed.
    pub target: &'a str,
}

/// All `ref` shortcodes in `content`, in document order.
pub fn extract_references(content: &str) -> Vec<RawReference<'_>> {
    REF_SHORTCODE
        .captures_iter(content)
        .filter_map(|caps| {
            let marker = caps.get(0)?.as_str();
            let target = unquote(caps.get(1)?.as_str());
            Some(RawReference { marker, target })
        })
        .collect()
}

/// Strips surrounding whitespace, then one pair of matching double or single quotes.
pub fn unquote(arg: &str) -> &str {
    let arg = arg.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    arg
}

/// `{{< ref "target" >}}`
pub fn render_ref(target: &str) -> String {
    format!("{{{{< ref \"{target}\" >}}}}")
}

/// Markdown link whose destination is a `ref` shortcode.
pub fn render_ref_link(text: &str, target: &str) -> String {
    format!("[{}]({})", text, render_ref(target))
}
