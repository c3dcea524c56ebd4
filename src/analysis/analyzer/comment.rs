//! The analyzer used to turn comments into feature terms.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::{LowercaseCharFilter, StripAccentsCharFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::ShingleFilter;
use crate::analysis::tokenizer::RegexTokenizer;
use crate::analysis::tokenizer::regex::DEFAULT_TOKEN_PATTERN;
use crate::error::Result;

/// Settings that fully determine how a comment is split into terms.
///
/// This is stored inside a fitted feature space, so the exact same analyzer
/// can be rebuilt after the space is loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowercase the text before tokenizing.
    pub lowercase: bool,
    /// Remove accent marks before tokenizing.
    pub strip_accents: bool,
    /// Regex whose matches are the word tokens.
    pub token_pattern: String,
    /// Inclusive word n-gram range.
    pub ngram_range: (usize, usize),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            lowercase: true,
            strip_accents: true,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            ngram_range: (1, 2),
        }
    }
}

/// Lowercase + accent folding + word tokens + word n-grams.
#[derive(Clone, Debug)]
pub struct CommentAnalyzer {
    config: AnalyzerConfig,
    inner: PipelineAnalyzer,
}

impl CommentAnalyzer {
    /// Build the analyzer with the default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Build the analyzer described by `config`.
    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::with_pattern(&config.token_pattern)?);
        let mut inner = PipelineAnalyzer::new(tokenizer).with_name("comment");

        if config.lowercase {
            inner = inner.add_char_filter(Arc::new(LowercaseCharFilter::new()));
        }
        if config.strip_accents {
            inner = inner.add_char_filter(Arc::new(StripAccentsCharFilter::new()));
        }

        let (min_n, max_n) = config.ngram_range;
        inner = inner.add_filter(Arc::new(ShingleFilter::new(min_n, max_n)?));

        Ok(CommentAnalyzer { config, inner })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

impl Analyzer for CommentAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "comment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comment_terms() {
        let analyzer = CommentAnalyzer::new().unwrap();
        let terms = analyzer.terms("Très GREAT video!").unwrap();

        assert_eq!(
            terms,
            vec!["tres", "great", "video", "tres great", "great video"]
        );
    }

    #[test]
    fn test_unigram_only_config() {
        let config = AnalyzerConfig {
            ngram_range: (1, 1),
            strip_accents: false,
            ..AnalyzerConfig::default()
        };
        let analyzer = CommentAnalyzer::with_config(config).unwrap();
        assert_eq!(analyzer.terms("Très bien").unwrap(), vec!["très", "bien"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalyzerConfig {
            ngram_range: (2, 1),
            ..AnalyzerConfig::default()
        };
        assert!(CommentAnalyzer::with_config(config).is_err());
    }
}
