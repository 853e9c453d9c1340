//! souq-text
//!
//! Tantivy-backed catalog index. Ranked prefix matching runs on per-language
//! tantivy fields; similarity, containment and predicate filtering run over
//! the records kept alongside the index.

pub mod index;
pub mod tantivy_utils;
pub mod trigram;

pub use index::TantivyCatalog;
