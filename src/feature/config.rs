//! Vectorizer configuration.

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::comment::AnalyzerConfig;
use crate::error::{Result, SentiscopeError};

/// How a feature space is fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Term extraction settings.
    pub analyzer: AnalyzerConfig,
    /// Keep at most this many terms, ranked by corpus-wide frequency.
    pub max_features: Option<usize>,
    /// Drop terms found in fewer documents than this.
    pub min_df: usize,
    /// Drop terms found in more than this fraction of documents.
    pub max_df: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            analyzer: AnalyzerConfig::default(),
            max_features: Some(5000),
            min_df: 2,
            max_df: 0.9,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(SentiscopeError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(SentiscopeError::invalid_config(
                "max_features must be positive",
            ));
        }
        let (min_n, max_n) = self.analyzer.ngram_range;
        if min_n == 0 || max_n < min_n {
            return Err(SentiscopeError::invalid_config(format!(
                "invalid n-gram range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VectorizerConfig::default();
        assert_eq!(config.max_features, Some(5000));
        assert_eq!(config.min_df, 2);
        assert_eq!(config.max_df, 0.9);
        assert_eq!(config.analyzer.ngram_range, (1, 2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = VectorizerConfig {
            max_df: 1.5,
            ..VectorizerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = VectorizerConfig {
            max_features: Some(0),
            ..VectorizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VectorizerConfig = serde_json::from_str(r#"{"min_df": 1}"#).unwrap();
        assert_eq!(config.min_df, 1);
        assert_eq!(config.max_features, Some(5000));
    }
}
