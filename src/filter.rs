//! File selection by extension allow-list and ignore patterns.
//!
//! An extension allow-list, when present, takes precedence over the
//! ignore set: requested extensions are included even if an ignore
//! pattern matches them, and everything else is excluded.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::patterns::IgnoreSet;

/// Normalized set of file extensions: lowercase, without a leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one extension token, normalizing it. Blank tokens are ignored.
    pub fn insert(&mut self, token: &str) {
        let token = token.trim();
        let token = token.strip_prefix('.').unwrap_or(token);
        if !token.is_empty() {
            self.extensions.insert(token.to_lowercase());
        }
    }

    /// Check membership, case-sensitively.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for raw in iter {
            for token in raw.split(',') {
                set.insert(token);
            }
        }
        set
    }
}

impl FromStr for ExtensionSet {
    type Err = std::convert::Infallible;

    /// Parse a comma-separated list such as `"py, js, css"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(std::iter::once(s).collect())
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

/// Parse raw extension input into an [`ExtensionSet`].
///
/// Each item may itself be comma-separated, so both `["py, js, css"]` and
/// `["py", "js", "css"]` produce the same set. Returns `None` when there is
/// no input at all (no items, or only blank items), meaning "no restriction".
///
/// # Examples
///
/// ```
/// use alloy::filter::parse_extensions;
///
/// let set = parse_extensions(["py, js, css"]).unwrap();
/// assert!(set.contains("js"));
///
/// let none: [&str; 0] = [];
/// assert!(parse_extensions(none).is_none());
/// ```
pub fn parse_extensions<I, S>(raw: I) -> Option<ExtensionSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<S> = raw.into_iter().collect();
    if items.iter().all(|item| item.as_ref().trim().is_empty()) {
        return None;
    }
    Some(items.iter().map(|item| item.as_ref()).collect())
}

/// Decide whether `file_name` passes the extension allow-list.
///
/// An absent or empty set allows everything. Otherwise the name must
/// carry a dot-delimited extension that is in the set; names without one,
/// including dotfiles like `.gitignore`, are rejected.
pub fn filter_extensions(file_name: &str, extensions: Option<&ExtensionSet>) -> bool {
    let Some(extensions) = extensions.filter(|set| !set.is_empty()) else {
        return true;
    };

    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(ext))
}

/// Why a file was included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    /// Extension is in the allow-list (ignore patterns bypassed).
    ExtensionAllowed,
    /// No allow-list and no ignore pattern matched.
    NotIgnored,
}

/// Why a file was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// An allow-list is active and the extension is not in it.
    ExtensionNotAllowed,
    /// An allow-list was given but parsed to nothing.
    EmptyAllowList,
    /// An ignore pattern matched.
    Ignored,
}

/// Result of applying the selection rules to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    Accept(AcceptReason),
    Reject(RejectReason),
}

impl FilterResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FilterResult::Accept(_))
    }
}

impl fmt::Display for FilterResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FilterResult::Accept(AcceptReason::ExtensionAllowed) => "included (extension allowed)",
            FilterResult::Accept(AcceptReason::NotIgnored) => "included",
            FilterResult::Reject(RejectReason::ExtensionNotAllowed) => {
                "excluded (extension not allowed)"
            }
            FilterResult::Reject(RejectReason::EmptyAllowList) => "excluded (empty extension list)",
            FilterResult::Reject(RejectReason::Ignored) => "excluded (ignore pattern)",
        };
        f.write_str(text)
    }
}

/// Apply the selection rules to a path relative to the project root.
///
/// With an allow-list only the extension decides and the ignore set is
/// never consulted. Without one, the ignore set is the sole exclusion
/// mechanism.
pub fn select(
    relative: &Path,
    ignore: &IgnoreSet,
    extensions: Option<&ExtensionSet>,
) -> FilterResult {
    match extensions {
        Some(set) if set.is_empty() => FilterResult::Reject(RejectReason::EmptyAllowList),
        Some(set) => {
            let name = relative
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            if filter_extensions(&name, Some(set)) {
                FilterResult::Accept(AcceptReason::ExtensionAllowed)
            } else {
                FilterResult::Reject(RejectReason::ExtensionNotAllowed)
            }
        }
        None if ignore.matches(relative) => FilterResult::Reject(RejectReason::Ignored),
        None => FilterResult::Accept(AcceptReason::NotIgnored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> ExtensionSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_filter_without_restriction() {
        assert!(filter_extensions("test.py", None));
        assert!(filter_extensions("test.py", Some(&ExtensionSet::new())));
        assert!(filter_extensions("Makefile", None));
    }

    #[test]
    fn test_filter_with_restriction() {
        let py = set(&["py"]);
        assert!(filter_extensions("test.py", Some(&py)));
        assert!(filter_extensions("pkg.tar.py", Some(&py)));
        assert!(!filter_extensions("test.js", Some(&py)));
    }

    #[test]
    fn test_filter_no_extension() {
        let py = set(&["py"]);
        assert!(!filter_extensions("test", Some(&py)));
        assert!(!filter_extensions(".gitignore", Some(&py)));
        assert!(!filter_extensions("trailing.", Some(&py)));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let py = set(&["py"]);
        assert!(!filter_extensions("SCRIPT.PY", Some(&py)));
    }

    #[test]
    fn test_parse_none() {
        let none: [&str; 0] = [];
        assert_eq!(parse_extensions(none), None);
        assert_eq!(parse_extensions([""]), None);
        assert_eq!(parse_extensions(["  "]), None);
    }

    #[test]
    fn test_parse_comma_string_and_list() {
        let expected = set(&["py", "js", "css"]);
        assert_eq!(parse_extensions(["py, js, css"]), Some(expected.clone()));
        assert_eq!(parse_extensions(["py", "js", "css"]), Some(expected.clone()));
        assert_eq!(
            parse_extensions(vec!["py,js".to_string(), "css".to_string()]),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_normalizes_tokens() {
        let parsed = parse_extensions([".PY, ,Js"]).unwrap();
        assert_eq!(parsed, set(&["py", "js"]));
        assert_eq!(parsed.to_string(), "js,py");
    }

    #[test]
    fn test_parse_degenerate_input_is_empty_set() {
        let parsed = parse_extensions([","]).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_from_str() {
        let parsed: ExtensionSet = "md, txt".parse().unwrap();
        assert_eq!(parsed, set(&["md", "txt"]));
    }

    #[test]
    fn test_select_without_allow_list() {
        let ignore = IgnoreSet::from_patterns([".png", ".svg"]);

        assert_eq!(
            select(Path::new("image.png"), &ignore, None),
            FilterResult::Reject(RejectReason::Ignored)
        );
        assert_eq!(
            select(Path::new("python.py"), &ignore, None),
            FilterResult::Accept(AcceptReason::NotIgnored)
        );
    }

    #[test]
    fn test_select_allow_list_bypasses_ignore() {
        let ignore = IgnoreSet::from_patterns([".png", ".svg"]);
        let svg = set(&["svg"]);

        assert_eq!(
            select(Path::new("subdirectory/vector.svg"), &ignore, Some(&svg)),
            FilterResult::Accept(AcceptReason::ExtensionAllowed)
        );
        assert_eq!(
            select(Path::new("markdown.md"), &ignore, Some(&svg)),
            FilterResult::Reject(RejectReason::ExtensionNotAllowed)
        );
        assert_eq!(
            select(Path::new("image.png"), &ignore, Some(&svg)),
            FilterResult::Reject(RejectReason::ExtensionNotAllowed)
        );
    }

    #[test]
    fn test_select_allow_list_ignores_directory_patterns() {
        let ignore = IgnoreSet::parse("vendor/\n");
        let rs = set(&["rs"]);

        assert!(select(Path::new("vendor/lib.rs"), &ignore, Some(&rs)).is_accepted());
        assert!(!select(Path::new("vendor/lib.rs"), &ignore, None).is_accepted());
    }

    #[test]
    fn test_select_empty_allow_list_rejects_everything() {
        let ignore = IgnoreSet::new();
        let empty = ExtensionSet::new();

        assert_eq!(
            select(Path::new("main.rs"), &ignore, Some(&empty)),
            FilterResult::Reject(RejectReason::EmptyAllowList)
        );
    }

    proptest! {
        #[test]
        fn unrestricted_filter_accepts_any_name(name in "[a-zA-Z0-9_.]{0,24}") {
            prop_assert!(filter_extensions(&name, None));
            prop_assert!(filter_extensions(&name, Some(&ExtensionSet::new())));
        }

        #[test]
        fn own_extension_accepted_other_rejected(
            stem in "[a-z]{1,8}",
            ext in "[a-z]{1,4}",
            other in "[a-z]{1,4}",
        ) {
            let name = format!("{}.{}", stem, ext);
            prop_assert!(filter_extensions(&name, Some(&set(&[ext.as_str()]))));
            if other != ext {
                prop_assert!(!filter_extensions(&name, Some(&set(&[other.as_str()]))));
            }
        }
    }
}
