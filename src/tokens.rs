//! Token counting for the consolidated document.
//!
//! Counting sits behind the [`Tokenizer`] trait so the consolidator never
//! depends on a particular algorithm. [`Tiktoken`] gives OpenAI-compatible
//! counts via tiktoken-rs; [`CharEstimate`] is the ~4 chars/token heuristic
//! it falls back to when a BPE table cannot be loaded.

use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

/// Something that can estimate the token count of a text.
pub trait Tokenizer {
    /// Count tokens in `text`.
    fn count_tokens(&self, text: &str) -> usize;
}

/// Token encoding to use for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            _ => Err(format!("unknown encoding: {}", s)),
        }
    }
}

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static O200K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn bpe(encoding: Encoding) -> Option<&'static CoreBPE> {
    match encoding {
        Encoding::Cl100kBase => CL100K
            .get_or_init(|| tiktoken_rs::cl100k_base().ok())
            .as_ref(),
        Encoding::O200kBase => O200K
            .get_or_init(|| tiktoken_rs::o200k_base().ok())
            .as_ref(),
    }
}

/// Tokenizer backed by a tiktoken BPE table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tiktoken {
    encoding: Encoding,
}

impl Tiktoken {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }
}

impl Tokenizer for Tiktoken {
    fn count_tokens(&self, text: &str) -> usize {
        match bpe(self.encoding) {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => CharEstimate.count_tokens(text),
        }
    }
}

/// Heuristic tokenizer: about four bytes per token, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimate;

impl Tokenizer for CharEstimate {
    fn count_tokens(&self, text: &str) -> usize {
        text.len().div_ceil(4)
    }
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> usize,
{
    fn count_tokens(&self, text: &str) -> usize {
        self(text)
    }
}

/// Count tokens in text using the default encoding (cl100k_base).
///
/// # Examples
///
/// ```
/// use alloy::tokens::count_tokens;
///
/// assert!(count_tokens("Hello, world!") > 0);
/// assert_eq!(count_tokens(""), 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    Tiktoken::default().count_tokens(text)
}
