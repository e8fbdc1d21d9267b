//! Keyword extraction used to tailor applications

pub mod text_processor;

pub use text_processor::{KeywordCoverage, TextProcessor};
