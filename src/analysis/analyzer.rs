//! Analyzers combine char filters, a tokenizer and token filters.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Terms
//! ```
//!
//! - [`PipelineAnalyzer`](pipeline::PipelineAnalyzer) - arbitrary chains
//! - [`CommentAnalyzer`](comment::CommentAnalyzer) - the fixed chain used for comment features

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers must be `Send + Sync`; a fitted feature space shares one
/// analyzer across every request thread.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Collect the text of every token produced for `text`.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

pub mod comment;
pub mod pipeline;

pub use comment::CommentAnalyzer;
pub use pipeline::PipelineAnalyzer;
