//! Index module: tokenization, posting writes and text compaction
//!
//! - `tokenizer`: whitespace tokens, lowercased, stop words removed
//! - `compression`: lossless zstd encoding of page bodies
//! - `builder`: the batch job that indexes crawled pages and compacts them

mod builder;
mod compression;
mod tokenizer;

pub use builder::{page_text, IndexBuilder, IndexReport, IndexedPage};
pub use compression::{compress_text, decompress_text};
pub use tokenizer::{tokenize, TokenFilter};
