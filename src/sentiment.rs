//! Sentiment labels.
//!
//! The corpus, the classifier and the HTTP surface all encode sentiment as
//! the integers -1, 0 and 1. [`Sentiment`] is the single place that knows
//! the mapping between those integers, the class index used by metrics, and
//! the lowercase names returned to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SentiscopeError;

/// One of the three sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// All classes in canonical (negative, neutral, positive) order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Integer score used by the corpus and the API.
    pub fn score(self) -> i8 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }

    /// Decode an integer score.
    pub fn from_score(score: i64) -> Option<Self> {
        match score {
            -1 => Some(Sentiment::Negative),
            0 => Some(Sentiment::Neutral),
            1 => Some(Sentiment::Positive),
            _ => None,
        }
    }

    /// Position in [`Sentiment::ALL`]; rows and columns of confusion matrices use it.
    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    /// Lowercase name returned to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }

    /// Capitalised name used in reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Sentiment> for i8 {
    fn from(sentiment: Sentiment) -> Self {
        sentiment.score()
    }
}

impl TryFrom<i8> for Sentiment {
    type Error = SentiscopeError;

    fn try_from(score: i8) -> Result<Self, Self::Error> {
        Sentiment::from_score(score as i64)
            .ok_or_else(|| SentiscopeError::other(format!("invalid sentiment score: {score}")))
    }
}

impl FromStr for Sentiment {
    type Err = SentiscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" | "-1" => Ok(Sentiment::Negative),
            "neutral" | "0" => Ok(Sentiment::Neutral),
            "positive" | "1" => Ok(Sentiment::Positive),
            other => Err(SentiscopeError::other(format!("unknown sentiment: {other}"))),
        }
    }
}
