//! Request limits.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentiscopeError, ValidationError};

/// Accepted batch sizes and text lengths, both inclusive.
///
/// Text length is counted in characters (Unicode scalar values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLimits {
    pub min_batch: usize,
    pub max_batch: usize,
    pub min_text_chars: usize,
    pub max_text_chars: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        BatchLimits {
            min_batch: 1,
            max_batch: 500,
            min_text_chars: 1,
            max_text_chars: 10_000,
        }
    }
}

impl BatchLimits {
    pub fn validate(&self) -> Result<()> {
        if self.min_batch == 0 || self.max_batch < self.min_batch {
            return Err(SentiscopeError::invalid_config(format!(
                "invalid batch size range [{}, {}]",
                self.min_batch, self.max_batch
            )));
        }
        if self.min_text_chars == 0 || self.max_text_chars < self.min_text_chars {
            return Err(SentiscopeError::invalid_config(format!(
                "invalid text length range [{}, {}]",
                self.min_text_chars, self.max_text_chars
            )));
        }
        Ok(())
    }

    /// Check a whole batch; the first violation wins.
    pub fn check_batch<S: AsRef<str>>(&self, texts: &[S]) -> std::result::Result<(), ValidationError> {
        if texts.len() < self.min_batch || texts.len() > self.max_batch {
            return Err(ValidationError::BatchSize {
                actual: texts.len(),
                min: self.min_batch,
                max: self.max_batch,
            });
        }
        for (index, text) in texts.iter().enumerate() {
            let chars = text.as_ref().chars().count();
            if chars < self.min_text_chars || chars > self.max_text_chars {
                return Err(ValidationError::TextLength {
                    index,
                    actual: chars,
                    min: self.min_text_chars,
                    max: self.max_text_chars,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_size_bounds() {
        let limits = BatchLimits::default();
        let batch = |n: usize| vec!["ok".to_string(); n];

        assert!(limits.check_batch(&batch(1)).is_ok());
        assert!(limits.check_batch(&batch(500)).is_ok());
        assert_eq!(
            limits.check_batch(&batch(0)),
            Err(ValidationError::BatchSize { actual: 0, min: 1, max: 500 })
        );
        assert!(limits.check_batch(&batch(501)).is_err());
    }

    #[test]
    fn test_text_length_bounds() {
        let limits = BatchLimits::default();

        assert!(limits.check_batch(&["a".to_string()]).is_ok());
        assert!(limits.check_batch(&["a".repeat(10_000)]).is_ok());
        assert!(limits.check_batch(&["a".repeat(10_001)]).is_err());

        let err = limits.check_batch(&["fine", ""]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TextLength { index: 1, actual: 0, min: 1, max: 10_000 }
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let limits = BatchLimits {
            max_text_chars: 3,
            ..BatchLimits::default()
        };
        // Three characters, nine bytes.
        assert!(limits.check_batch(&["日本語"]).is_ok());
        assert!(limits.check_batch(&["日本語!"]).is_err());
    }

    #[test]
    fn test_invalid_limits() {
        let limits = BatchLimits {
            min_batch: 10,
            max_batch: 5,
            ..BatchLimits::default()
        };
        assert!(limits.validate().is_err());
        assert!(BatchLimits::default().validate().is_ok());
    }
}
