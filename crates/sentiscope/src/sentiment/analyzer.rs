//! Cleans post text and scores it against a lexicon.

use serde::Serialize;
use tracing::debug;

use super::lexicon::{Lexicon, NEGATION_FACTOR};
use super::Sentiment;
use crate::clean::TextCleaner;
use crate::config::Config;
use crate::error::Result;

/// Outcome of scoring one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    /// The text after noise stripping.
    pub cleaned: String,
    /// Mean polarity in `[-1, 1]`.
    pub polarity: f64,
    /// Bucketed polarity.
    pub sentiment: Sentiment,
}

/// Turns raw post text into a [`Score`].
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer {
    cleaner: TextCleaner,
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    /// Analyzer with the built-in cleaner and lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer from explicit parts.
    #[must_use]
    pub fn with_parts(cleaner: TextCleaner, lexicon: Lexicon) -> Self {
        Self { cleaner, lexicon }
    }

    /// Analyzer built from the `clean` and `sentiment` config sections.
    ///
    /// # Errors
    ///
    /// Returns an error if an extra noise pattern is invalid or the lexicon
    /// file cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cleaner = TextCleaner::with_extra_patterns(&config.clean.extra_patterns)?;
        let lexicon = match &config.sentiment.lexicon_path {
            Some(path) => Lexicon::with_overrides(path)?,
            None => Lexicon::builtin(),
        };
        debug!(
            patterns = cleaner.pattern_names().len(),
            words = lexicon.len(),
            "Sentiment analyzer ready"
        );
        Ok(Self::with_parts(cleaner, lexicon))
    }

    /// The cleaner used before scoring.
    #[must_use]
    pub fn cleaner(&self) -> &TextCleaner {
        &self.cleaner
    }

    /// Polarity of already-cleaned text.
    ///
    /// Intensifiers and negations carry forward to the next polarity word.
    /// Returns 0.0 when the text holds no polarity words.
    #[must_use]
    pub fn polarity(&self, cleaned: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negate = false;
        let mut multiplier: Option<f64> = None;
        let mut previous: Option<String> = None;

        for token in cleaned.split_whitespace() {
            let word = token.to_lowercase();

            let split_negation = word == "t"
                && previous
                    .as_deref()
                    .is_some_and(|stem| self.lexicon.is_contraction_stem(stem));

            if split_negation || self.lexicon.is_negation(&word) {
                negate = true;
            } else if let Some(factor) = self.lexicon.intensifier(&word) {
                multiplier = Some(multiplier.unwrap_or(1.0) * factor);
            } else if let Some(base) = self.lexicon.score(&word) {
                let mut score = base * multiplier.take().unwrap_or(1.0);
                if negate {
                    score *= NEGATION_FACTOR;
                    negate = false;
                }
                scores.push(score.clamp(-1.0, 1.0));
            }

            previous = Some(word);
        }

        if scores.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean
    }

    /// Clean `raw` and score it.
    #[must_use]
    pub fn analyze(&self, raw: &str) -> Score {
        let cleaned = self.cleaner.clean(raw);
        let polarity = self.polarity(&cleaned);
        Score {
            sentiment: Sentiment::from_polarity(polarity),
            cleaned,
            polarity,
        }
    }
}
