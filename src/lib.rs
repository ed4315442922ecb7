//! Alloy - Consolidate a codebase into a single markdown document.
//!
//! Alloy walks a project directory, decides which files to include using an
//! `.alloyignore` file and/or an extension allow-list, and renders the
//! surviving files into one markdown document with a token estimate.
//!
//! # Quick Start
//!
//! ```no_run
//! use alloy::{consolidate, parse_extensions};
//!
//! let result = consolidate("./my-project", parse_extensions(["rs, toml"])).unwrap();
//!
//! println!("{} files, {} tokens", result.file_count, result.token_count);
//! print!("{}", result.document);
//! ```
//!
//! # Modules
//!
//! - [`markdown`] - Heading escapes, whitespace normalization, document assembly
//! - [`patterns`] - `.alloyignore` pattern compilation and matching
//! - [`filter`] - Extension allow-list and the include/exclude decision
//! - [`walker`] - Deterministic directory traversal
//! - [`tokens`] - Token counting for LLM context budgets
//! - [`builder`] - Fluent API for consolidation
//!
//! # Selection rules
//!
//! Without an extension list, a file is included unless an ignore pattern
//! matches it. With an extension list, only the extension decides: listed
//! extensions are included even when ignored, everything else is dropped.

pub mod builder;
pub mod errors;
pub mod filter;
pub mod markdown;
pub mod patterns;
pub mod tokens;
pub mod walker;

// Re-export key types at crate root for convenience
pub use builder::{consolidate, Alloy, Consolidation, Selection, SkippedFile};
pub use errors::{exit_code, AlloyError};
pub use filter::{filter_extensions, parse_extensions, ExtensionSet, FilterResult};
pub use markdown::{escape_markdown_characters, remove_trailing_whitespace};
pub use patterns::{read_alloyignore, IgnoreSet, PatternError, DEFAULT_IGNORE_FILE};
pub use tokens::{count_tokens, Encoding, Tokenizer};
pub use walker::{WalkError, WalkOptions};
