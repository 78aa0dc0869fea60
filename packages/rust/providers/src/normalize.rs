//! Markup to plain text.
//!
//! Passes run in order: drop script/style blocks, strip tags, collapse
//! whitespace, trim, cap length.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on normalized text, in characters.
pub const MAX_NORMALIZED_CHARS: usize = 4000;

/// Strip markup from `raw` and return at most [`MAX_NORMALIZED_CHARS`] characters
/// of single-spaced text.
pub fn normalize_html(raw: &str) -> String {
    let text = strip_script_and_style(raw);
    let text = strip_tags(&text);
    let text = collapse_whitespace(&text);
    truncate_chars(text.trim(), MAX_NORMALIZED_CHARS)
}

/// Remove `<script>` and `<style>` elements including their contents.
fn strip_script_and_style(html: &str) -> String {
    static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
            .expect("valid regex")
    });

    BLOCK_RE.replace_all(html, " ").into_owned()
}

/// Replace every remaining tag with a space so adjacent blocks don't fuse.
fn strip_tags(html: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

    TAG_RE.replace_all(html, " ").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").into_owned()
}

/// Keep the first `max` characters (not bytes).
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
