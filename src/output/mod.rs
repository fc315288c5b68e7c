//! Output module for reporting on the index database
//!
//! This module handles:
//! - Collecting crawl and index statistics
//! - Printing them for the `stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, IndexStatistics};
