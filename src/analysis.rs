//! Text analysis module for Sentiscope.
//!
//! Turns raw comment text into the terms the feature extractor counts:
//! char filters normalise the text, a tokenizer splits it into words, and
//! token filters expand words into n-gram terms.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, CommentAnalyzer, PipelineAnalyzer};
pub use token::{Token, TokenStream};
