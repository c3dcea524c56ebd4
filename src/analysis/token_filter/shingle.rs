//! Word n-gram ("shingle") filter.
//!
//! Turns a stream of word tokens into the n-gram terms used as features.
//! With `min_n = 1` and `max_n = 2`, `"great funny video"` yields
//!
//! ```text
//! great, funny, video, great funny, funny video
//! ```
//!
//! All n-grams of one order are emitted before the next order starts.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{Result, SentiscopeError};

/// Emits all word n-grams with `min_n <= n <= max_n`, joined by a single space.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_n: usize,
    max_n: usize,
}

impl ShingleFilter {
    /// Create a filter for the inclusive n-gram range `min_n..=max_n`.
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || max_n < min_n {
            return Err(SentiscopeError::analysis(format!(
                "Invalid n-gram range ({min_n}, {max_n})"
            )));
        }
        Ok(ShingleFilter { min_n, max_n })
    }

    pub fn min_n(&self) -> usize {
        self.min_n
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.collect();
        if self.min_n == 1 && self.max_n == 1 {
            return Ok(Box::new(words.into_iter()));
        }

        let mut out = Vec::with_capacity(words.len() * (self.max_n - self.min_n + 1));
        for n in self.min_n..=self.max_n {
            if n > words.len() {
                break;
            }
            if n == 1 {
                out.extend(words.iter().cloned());
                continue;
            }
            for window in words.windows(n) {
                let text = window
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let first = &window[0];
                let last = &window[n - 1];
                out.push(
                    Token::with_offsets(text, first.position, first.start_offset, last.end_offset)
                        .with_position_length(n),
                );
            }
        }

        Ok(Box::new(out.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}
