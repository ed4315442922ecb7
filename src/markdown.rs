//! Markdown rendering helpers.
//!
//! Escapes file paths for use in headings, normalizes whitespace, and
//! assembles per-file blocks into one consolidated document.

use std::path::{Component, Path};

/// Characters that carry meaning in markdown and get a backslash prefix.
const SPECIAL: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!', '>', '|',
];

/// Heading prefix for every file block.
pub const HEADING: &str = "####";

/// Escape markdown special characters in `text`.
///
/// Every special character is escaped on its own, so runs like `__`
/// become `\_\_`. `/` is not special and stays readable.
///
/// # Examples
///
/// ```
/// use alloy::markdown::escape_markdown_characters;
///
/// assert_eq!(escape_markdown_characters("__init__.py"), "\\_\\_init\\_\\_\\.py");
/// ```
pub fn escape_markdown_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Strip trailing spaces and tabs from every line and collapse runs of
/// three or more newlines down to two.
///
/// Leading whitespace and line endings are otherwise untouched. The
/// function is idempotent.
///
/// # Examples
///
/// ```
/// use alloy::markdown::remove_trailing_whitespace;
///
/// assert_eq!(remove_trailing_whitespace("test\n\n\n\ntest\n\n\n"), "test\n\ntest\n\n");
/// ```
pub fn remove_trailing_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Newlines seen since the last non-blank line.
    let mut newlines = 0usize;

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        }

        let line = line.trim_end_matches([' ', '\t']);
        if !line.is_empty() {
            newlines = 0;
            out.push_str(line);
        }
    }

    out
}

/// Render a relative path with `/` separators regardless of platform.
pub fn display_relative(relative: &Path) -> String {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy()),
            Component::ParentDir => parts.push("..".into()),
            _ => {}
        }
    }
    parts.join("/")
}

/// Markdown heading line for a file, without the trailing newline.
pub fn heading(relative: &Path) -> String {
    format!(
        "{} {}",
        HEADING,
        escape_markdown_characters(&display_relative(relative))
    )
}

/// Accumulates file blocks into a single markdown document.
///
/// Content is appended raw; whitespace normalization happens once over
/// the whole document in [`Document::finish`].
#[derive(Debug, Default)]
pub struct Document {
    text: String,
    files: usize,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `#### <path>` heading followed by the file content.
    ///
    /// Blocks are separated only by the content's own line ending; a
    /// newline is added when the content lacks one.
    pub fn push_file(&mut self, relative: &Path, content: &str) {
        self.text.push_str(&heading(relative));
        self.text.push('\n');
        self.text.push_str(content);
        if !content.ends_with('\n') {
            self.text.push('\n');
        }

        self.files += 1;
    }

    /// Number of files appended so far.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Whether no file has been appended.
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    /// Normalize whitespace and return the finished text.
    pub fn finish(self) -> String {
        remove_trailing_whitespace(&self.text)
    }
}
