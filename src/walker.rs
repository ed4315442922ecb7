//! Directory traversal.
//!
//! Uses the `ignore` crate to list the regular files under a root in a
//! deterministic order: depth-first, sorted by file name at every level.
//! `.git` directories are always skipped. Other standard filters are off
//! by default so that `.alloyignore` stays the only exclusion mechanism;
//! hidden-file and `.gitignore` filtering can be switched on.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop detected: {path}")]
    SymlinkLoop { path: PathBuf },
}

impl WalkError {
    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            WalkError::NotFound { path }
            | WalkError::NotADirectory { path }
            | WalkError::PermissionDenied { path }
            | WalkError::Io { path, .. }
            | WalkError::SymlinkLoop { path } => path,
        }
    }
}

/// Options for directory walking.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Maximum depth to recurse (None = unlimited).
    pub max_depth: Option<usize>,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Include hidden files and directories.
    pub include_hidden: bool,
    /// Respect .gitignore patterns.
    pub respect_gitignore: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            follow_symlinks: false,
            include_hidden: true,
            respect_gitignore: false,
        }
    }
}

impl WalkOptions {
    /// Create options that skip hidden files.
    pub fn without_hidden() -> Self {
        Self {
            include_hidden: false,
            ..Default::default()
        }
    }

    /// Set maximum depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Walk `root`, yielding the path of every regular file.
///
/// Errors below the root (an unreadable directory, a broken link) are
/// yielded in place and the walk carries on.
///
/// # Examples
///
/// ```no_run
/// use alloy::walker::{walk, WalkOptions};
/// use std::path::Path;
///
/// for path in walk(Path::new("."), &WalkOptions::default()).flatten() {
///     println!("{}", path.display());
/// }
/// ```
pub fn walk(
    root: &Path,
    options: &WalkOptions,
) -> impl Iterator<Item = Result<PathBuf, WalkError>> {
    let mut builder = WalkBuilder::new(root);

    builder
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .parents(options.respect_gitignore)
        .require_git(false)
        .follow_links(options.follow_symlinks)
        .max_depth(options.max_depth)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != ".git");

    builder.build().filter_map(|result| match result {
        Ok(entry) => {
            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            is_file.then(|| Ok(entry.into_path()))
        }
        Err(e) => convert_error(e, None).map(Err),
    })
}

/// List every regular file under `root`, checking the root first.
///
/// Per-entry errors are returned next to the files rather than aborting.
pub fn list_files(
    root: &Path,
    options: &WalkOptions,
) -> Result<(Vec<PathBuf>, Vec<WalkError>), WalkError> {
    if !root.exists() {
        return Err(WalkError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for result in walk(root, options) {
        match result {
            Ok(path) => files.push(path),
            Err(e) => errors.push(e),
        }
    }
    Ok((files, errors))
}

fn convert_error(err: ignore::Error, path: Option<PathBuf>) -> Option<WalkError> {
    match err {
        ignore::Error::WithPath { path, err } => convert_error(*err, Some(path)),
        ignore::Error::WithDepth { err, .. } => convert_error(*err, path),
        ignore::Error::Loop { child, .. } => Some(WalkError::SymlinkLoop { path: child }),
        ignore::Error::Io(source) => {
            let path = path.unwrap_or_else(|| PathBuf::from("<walk error>"));
            if source.kind() == std::io::ErrorKind::PermissionDenied {
                Some(WalkError::PermissionDenied { path })
            } else {
                Some(WalkError::Io { path, source })
            }
        }
        // Ignore-file parse errors and the like do not affect the listing.
        _ => None,
    }
}
