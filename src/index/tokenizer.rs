//! Body text normalization
//!
//! Tokens are exact lowercase whitespace-separated words. There is no
//! stemming and no punctuation stripping: `cat` and `cat,` are different
//! words.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Set of tokens excluded from the index (stop words)
#[derive(Debug, Clone, Default)]
pub struct TokenFilter {
    excluded: HashSet<String>,
}

impl TokenFilter {
    /// Creates a filter that excludes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a filter from words; entries are trimmed and lowercased so they
    /// compare equal to normalized tokens
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { excluded }
    }

    /// Loads a stop-word list with one word per line
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_words(content.lines()))
    }

    /// Returns true if the token must not be indexed
    pub fn excludes(&self, token: &str) -> bool {
        self.excluded.contains(token)
    }

    /// Number of excluded words
    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    /// Returns true if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

/// Normalizes a body into its set of indexable tokens
///
/// Splits on whitespace, lowercases, trims, then removes every token in the
/// filter. Duplicates collapse, so the result does not depend on word order
/// or repetition. The set is ordered to keep posting writes deterministic.
pub fn tokenize(body: &str, filter: &TokenFilter) -> BTreeSet<String> {
    let mut tokens: BTreeSet<String> = body
        .split_whitespace()
        .map(|word| word.to_lowercase().trim().to_string())
        .filter(|word| !word.is_empty())
        .collect();
    tokens.retain(|token| !filter.excludes(token));
    tokens
}
