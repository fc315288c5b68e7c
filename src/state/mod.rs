//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Lifecycle of a title (open link, crawled page, indexed page)
//! - `RequestPacer`: Minimum spacing between calls to the document source

mod pacer;
mod page_state;

// Re-export main types
pub use pacer::RequestPacer;
pub use page_state::PageState;
