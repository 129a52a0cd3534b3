//! Sentiment scoring.
//!
//! Posts are scored with a lexicon: each known word carries a polarity in
//! `[-1, 1]`, intensifiers scale the next known word and negations flip and
//! damp it. The post's polarity is the mean over the known words it contains
//! and is then bucketed into [`Sentiment`].

mod analyzer;
mod lexicon;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use analyzer::{Score, SentimentAnalyzer};
pub use lexicon::{Lexicon, NEGATION_FACTOR};

/// Three-way sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Polarity below zero.
    Negative,
    /// Polarity exactly zero.
    Neutral,
    /// Polarity above zero.
    Positive,
}

impl Sentiment {
    /// All buckets, from lowest to highest.
    pub const ALL: [Self; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Bucket a polarity score.
    #[must_use]
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Self::Positive
        } else if polarity < 0.0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Numeric value used in exports and on the chart axis.
    #[must_use]
    pub fn value(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Neutral => 0,
            Self::Positive => 1,
        }
    }

    /// Inverse of [`Sentiment::value`].
    #[must_use]
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Negative),
            0 => Some(Self::Neutral),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Axis label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
