//! Ignore-file patterns.
//!
//! Compiles the lines of an `.alloyignore` file into an [`IgnoreSet`]:
//! an ordered list of rules where any single match excludes a path.
//! There is no negation.
//!
//! Pattern forms:
//!
//! - `name` or `*.ext` (no `/`): matches any path component, file or directory
//! - `.ext`: shorthand for `*.ext`
//! - `dir/name`, `/name`: anchored at the root, matching a leading run of components
//! - trailing `/`: only matches directories
//!
//! Wildcards never cross a `/`. `**` is accepted but only spans a single
//! segment.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use thiserror::Error;
use tracing::{debug, warn};

/// Default ignore-file name looked up at the project root.
pub const DEFAULT_IGNORE_FILE: &str = ".alloyignore";

/// Errors that can occur while loading ignore patterns.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read ignore file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Matcher for a single path segment.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Exact, case-sensitive name.
    Literal(String),
    /// Glob limited to one segment.
    Wildcard(Pattern),
}

impl Segment {
    fn compile(raw: &str) -> Result<Self, glob::PatternError> {
        if raw.contains(['*', '?', '[']) {
            Pattern::new(raw).map(Segment::Wildcard)
        } else {
            Ok(Segment::Literal(raw.to_string()))
        }
    }

    /// Check whether a path segment matches.
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(name) => name == segment,
            Segment::Wildcard(pattern) => pattern.matches(segment),
        }
    }
}

/// A compiled ignore rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Matches any component of the path.
    Name { segment: Segment, dir_only: bool },
    /// Matches the leading components of the path.
    Anchored {
        segments: Vec<Segment>,
        dir_only: bool,
    },
}

impl Rule {
    /// Compile one pattern line. Returns `Ok(None)` for lines that carry
    /// no rule (blank, comment, negation).
    pub fn parse(line: &str) -> Result<Option<Self>, glob::PatternError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if line.starts_with('!') {
            warn!(pattern = line, "negated patterns are not supported, skipping");
            return Ok(None);
        }

        let (body, dir_only) = match line.strip_suffix('/') {
            Some(body) => (body, true),
            None => (line, false),
        };
        let (body, rooted) = match body.strip_prefix('/') {
            Some(body) => (body, true),
            None => (body, false),
        };
        if body.is_empty() {
            return Ok(None);
        }

        if !rooted && !body.contains('/') {
            let segment = if body.starts_with('.') && !body.contains(['*', '?', '[']) {
                Segment::compile(&format!("*{}", body))?
            } else {
                Segment::compile(body)?
            };
            return Ok(Some(Rule::Name { segment, dir_only }));
        }

        let segments = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::compile)
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            warn!(pattern = line, "pattern names no path segment, skipping");
            return Ok(None);
        }

        Ok(Some(Rule::Anchored { segments, dir_only }))
    }

    /// Check the rule against a path split into components.
    pub fn matches(&self, components: &[String]) -> bool {
        match self {
            Rule::Name { segment, dir_only } => {
                let candidates = if *dir_only {
                    &components[..components.len().saturating_sub(1)]
                } else {
                    components
                };
                candidates.iter().any(|c| segment.matches(c))
            }
            Rule::Anchored { segments, dir_only } => {
                let needed = segments.len() + usize::from(*dir_only);
                components.len() >= needed
                    && segments
                        .iter()
                        .zip(components)
                        .all(|(segment, component)| segment.matches(component))
            }
        }
    }
}

/// Set of compiled ignore rules.
///
/// # Examples
///
/// ```
/// use alloy::patterns::IgnoreSet;
///
/// let set = IgnoreSet::parse(".png\n# images\n.svg\n");
/// assert!(set.matches("test.png"));
/// assert!(set.matches("nested/vector.svg"));
/// assert!(!set.matches("test.md"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    rules: Vec<Rule>,
}

impl IgnoreSet {
    /// Create an empty set that matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile ignore-file content.
    pub fn parse(content: &str) -> Self {
        Self::from_patterns(content.lines())
    }

    /// Compile individual patterns. Patterns that fail to compile are
    /// skipped with a warning.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(patterns);
        set
    }

    /// Append more patterns after the existing ones.
    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Rule::parse(pattern) {
                Ok(Some(rule)) => self.rules.push(rule),
                Ok(None) => {}
                Err(e) => warn!(pattern = pattern, error = %e, "invalid ignore pattern, skipping"),
            }
        }
    }

    /// Load `file_name` from `root` and union it with `extra` patterns.
    ///
    /// A missing ignore file yields just the extra patterns.
    pub fn load<S: AsRef<str>>(
        root: &Path,
        file_name: &str,
        extra: &[S],
    ) -> Result<Self, PatternError> {
        let path = root.join(file_name);
        let mut set = match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded ignore file");
                Self::parse(&content)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::new(),
            Err(source) => return Err(PatternError::Read { path, source }),
        };
        set.extend(extra);
        Ok(set)
    }

    /// Check whether a path relative to the root is excluded.
    pub fn matches(&self, relative: impl AsRef<Path>) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let components: Vec<String> = relative
            .as_ref()
            .iter()
            .map(|c| c.to_string_lossy().into_owned())
            .filter(|c| c != "/" && c != ".")
            .collect();
        self.rules.iter().any(|rule| rule.matches(&components))
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Build the ignore set for `root` from its `.alloyignore` plus `extra_patterns`.
pub fn read_alloyignore<S: AsRef<str>>(
    root: &Path,
    extra_patterns: &[S],
) -> Result<IgnoreSet, PatternError> {
    IgnoreSet::load(root, DEFAULT_IGNORE_FILE, extra_patterns)
}
