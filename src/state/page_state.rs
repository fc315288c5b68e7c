/// Page lifecycle definitions
///
/// A page moves through three states, each recorded purely by which columns
/// of its row are populated. There is no separate status column: the data
/// itself is the completion marker.
use std::fmt;

/// Represents where a title currently sits in the crawl/index lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Title is known only as an open link; no page row exists yet
    Open,

    /// Page was fetched; raw text is stored and waiting to be indexed
    Crawled,

    /// Page postings are committed and its text is compacted
    Indexed,
}

impl PageState {
    /// Derives the state of a stored page row from its text columns
    ///
    /// A row holding compressed text is indexed regardless of the raw column.
    /// A row holding neither is treated as open, which only happens if a
    /// row was written outside the normal resolve path.
    pub fn from_columns(has_raw_text: bool, has_compressed_text: bool) -> Self {
        match (has_raw_text, has_compressed_text) {
            (_, true) => Self::Indexed,
            (true, false) => Self::Crawled,
            (false, false) => Self::Open,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal lifecycle step
    ///
    /// Crawling (or recrawling) may happen from any state; compaction is only
    /// legal from `Crawled`, so a page-version is indexed at most once.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        match next {
            Self::Open => false,
            Self::Crawled => true,
            Self::Indexed => matches!(self, Self::Crawled),
        }
    }

    /// Returns true if the page has been fetched at least once
    pub fn is_crawled(&self) -> bool {
        matches!(self, Self::Crawled | Self::Indexed)
    }

    /// Returns true if the page is waiting for the index builder
    pub fn needs_indexing(&self) -> bool {
        matches!(self, Self::Crawled)
    }

    /// Short lowercase name used in logs and statistics output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Crawled => "crawled",
            Self::Indexed => "indexed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Open, Self::Crawled, Self::Indexed]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
