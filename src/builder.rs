//! Fluent builder API for consolidation.
//!
//! Ties the pipeline together: list files under the root, select them
//! with the ignore set and extension allow-list, read the survivors,
//! render one markdown document and count its tokens.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::AlloyError;
use crate::filter::{select, ExtensionSet, FilterResult};
use crate::markdown::{display_relative, Document};
use crate::patterns::{IgnoreSet, DEFAULT_IGNORE_FILE};
use crate::tokens::{Encoding, Tiktoken, Tokenizer};
use crate::walker::{list_files, WalkError, WalkOptions};

/// Builder for consolidating a codebase into one markdown document.
///
/// # Examples
///
/// ```no_run
/// use alloy::builder::Alloy;
/// use alloy::filter::parse_extensions;
///
/// let result = Alloy::new("./project")
///     .extensions(parse_extensions(["rs, toml"]))
///     .exclude(["target/"])
///     .consolidate()
///     .unwrap();
///
/// println!("{} files, {} tokens", result.file_count, result.token_count);
/// ```
pub struct Alloy {
    root: PathBuf,
    extensions: Option<ExtensionSet>,
    ignore_file: String,
    exclude: Vec<String>,
    walk_options: WalkOptions,
    tokenizer: Box<dyn Tokenizer>,
}

impl Alloy {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: None,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            exclude: Vec::new(),
            walk_options: WalkOptions::default(),
            tokenizer: Box::new(Tiktoken::default()),
        }
    }

    /// Restrict output to these extensions, bypassing ignore patterns.
    pub fn extensions(mut self, extensions: Option<ExtensionSet>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Name of the ignore file looked up at the root.
    pub fn ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignore_file = name.into();
        self
    }

    /// Extra ignore patterns, applied together with the ignore file.
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Include hidden files (default: true).
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.walk_options.include_hidden = include;
        self
    }

    /// Also skip files matched by `.gitignore` (default: false).
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.walk_options.respect_gitignore = respect;
        self
    }

    /// Follow symbolic links.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.walk_options.follow_symlinks = follow;
        self
    }

    /// Set maximum directory depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.walk_options.max_depth = Some(depth);
        self
    }

    /// Count tokens with a tiktoken encoding.
    pub fn encoding(self, encoding: Encoding) -> Self {
        self.tokenizer(Tiktoken::new(encoding))
    }

    /// Count tokens with a custom tokenizer.
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Decide, for every file under the root, whether it would be included.
    ///
    /// Nothing is read. Files are returned in traversal order; entries the
    /// walker could not read are logged and left out.
    pub fn select(&self) -> Result<Vec<Selection>, AlloyError> {
        let (selections, _) = self.plan()?;
        Ok(selections)
    }

    fn plan(&self) -> Result<(Vec<Selection>, Vec<WalkError>), AlloyError> {
        // Root checks come first so a bad root is reported as such.
        let (files, walk_errors) = list_files(&self.root, &self.walk_options)?;
        let ignore = IgnoreSet::load(&self.root, &self.ignore_file, self.exclude.as_slice())?;
        for error in &walk_errors {
            warn!(error = %error, "skipping unreadable entry");
        }

        let ignore_path = self.root.join(&self.ignore_file);
        let selections = files
            .into_iter()
            .filter(|path| *path != ignore_path)
            .map(|path| {
                let relative = path
                    .strip_prefix(&self.root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.clone());
                let result = select(&relative, &ignore, self.extensions.as_ref());
                debug!(path = %relative.display(), decision = %result, "selected");
                Selection {
                    path,
                    relative,
                    result,
                }
            })
            .collect();

        Ok((selections, walk_errors))
    }

    /// Build the consolidated document.
    pub fn consolidate(self) -> Result<Consolidation, AlloyError> {
        let (selections, walk_errors) = self.plan()?;

        let mut document = Document::new();
        let mut skipped = Vec::new();

        for selection in selections.into_iter().filter(|s| s.result.is_accepted()) {
            match fs::read_to_string(&selection.path) {
                Ok(content) => document.push_file(&selection.relative, &content),
                Err(error) => {
                    warn!(
                        path = %selection.relative.display(),
                        error = %error,
                        "skipping unreadable file"
                    );
                    skipped.push(SkippedFile {
                        path: selection.relative,
                        error,
                    });
                }
            }
        }

        let file_count = document.file_count();
        let document = document.finish();
        let token_count = self.tokenizer.count_tokens(&document);

        info!(
            root = %self.root.display(),
            file_count,
            token_count,
            skipped = skipped.len(),
            walk_errors = walk_errors.len(),
            "consolidated"
        );

        Ok(Consolidation {
            document,
            file_count,
            token_count,
            skipped,
            walk_errors,
        })
    }
}

/// Selection decision for one file.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Path as listed by the walker.
    pub path: PathBuf,
    /// Path relative to the root.
    pub relative: PathBuf,
    pub result: FilterResult,
}

impl Selection {
    /// Relative path with `/` separators.
    pub fn display(&self) -> String {
        display_relative(&self.relative)
    }
}

/// A selected file that could not be read.
#[derive(Debug)]
pub struct SkippedFile {
    /// Path relative to the root.
    pub path: PathBuf,
    pub error: io::Error,
}

/// Result of a consolidation run.
#[derive(Debug)]
pub struct Consolidation {
    /// The whitespace-normalized markdown document.
    pub document: String,
    /// Number of files rendered into the document.
    pub file_count: usize,
    /// Token estimate for `document`.
    pub token_count: usize,
    /// Selected files that were skipped because they could not be read.
    pub skipped: Vec<SkippedFile>,
    /// Entries below the root that the walker could not read.
    pub walk_errors: Vec<WalkError>,
}

impl Consolidation {
    /// Split into `(document, file_count, token_count)`.
    pub fn into_parts(self) -> (String, usize, usize) {
        (self.document, self.file_count, self.token_count)
    }
}

/// Consolidate `root` with default options.
///
/// Shorthand for `Alloy::new(root).extensions(extensions).consolidate()`.
pub fn consolidate(
    root: impl Into<PathBuf>,
    extensions: Option<ExtensionSet>,
) -> Result<Consolidation, AlloyError> {
    Alloy::new(root).extensions(extensions).consolidate()
}
