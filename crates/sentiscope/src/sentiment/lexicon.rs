//! Polarity lexicon for rule-based scoring.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Multiplier applied to a lexicon word preceded by a negation.
pub const NEGATION_FACTOR: f64 = -0.5;

const POSITIVE: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("best", 1.0),
    ("better", 0.5),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("perfect", 1.0),
    ("beautiful", 0.85),
    ("lovely", 0.5),
    ("love", 0.5),
    ("loved", 0.7),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("fun", 0.3),
    ("funny", 0.25),
    ("cool", 0.35),
    ("brilliant", 0.9),
    ("proud", 0.8),
    ("exciting", 0.3),
    ("excited", 0.4),
    ("incredible", 0.9),
    ("impressive", 1.0),
    ("successful", 0.75),
    ("win", 0.8),
    ("winning", 0.5),
    ("strong", 0.43),
    ("fresh", 0.3),
    ("free", 0.4),
    ("safe", 0.5),
    ("easy", 0.43),
    ("helpful", 0.5),
    ("kind", 0.6),
    ("thankful", 0.5),
    ("grateful", 0.5),
    ("enjoy", 0.4),
    ("enjoyed", 0.5),
    ("positive", 0.23),
    ("favorite", 0.5),
    ("favourite", 0.5),
    ("sweet", 0.35),
    ("superb", 1.0),
    ("outstanding", 0.5),
    ("hope", 0.3),
    ("hopeful", 0.4),
    ("true", 0.35),
    ("important", 0.4),
    ("special", 0.36),
    ("new", 0.14),
    ("right", 0.29),
    ("well", 0.2),
    ("fine", 0.42),
    ("wow", 0.1),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("poor", -0.4),
    ("hate", -0.8),
    ("hated", -0.9),
    ("sad", -0.5),
    ("angry", -0.5),
    ("upset", -0.5),
    ("wrong", -0.5),
    ("ugly", -0.7),
    ("boring", -1.0),
    ("stupid", -0.8),
    ("dumb", -0.38),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("annoying", -0.8),
    ("sick", -0.71),
    ("tired", -0.4),
    ("broken", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.32),
    ("lose", -0.4),
    ("lost", -0.2),
    ("loss", -0.4),
    ("crazy", -0.6),
    ("dead", -0.2),
    ("dangerous", -0.6),
    ("scary", -0.5),
    ("afraid", -0.6),
    ("worried", -0.4),
    ("hard", -0.29),
    ("difficult", -0.5),
    ("slow", -0.3),
    ("fake", -0.5),
    ("weak", -0.38),
    ("sorry", -0.5),
    ("pathetic", -1.0),
    ("disgusting", -1.0),
    ("evil", -1.0),
    ("shame", -0.3),
    ("negative", -0.3),
    ("problem", -0.3),
    ("crisis", -0.6),
    ("unfair", -0.5),
    ("useless", -0.5),
    ("miserable", -1.0),
    ("painful", -0.7),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("so", 1.2),
    ("extremely", 1.5),
    ("incredibly", 1.4),
    ("totally", 1.2),
    ("absolutely", 1.4),
    ("super", 1.3),
    ("most", 1.3),
    ("highly", 1.3),
    ("quite", 1.1),
    ("pretty", 1.1),
    ("slightly", 0.6),
    ("somewhat", 0.7),
    ("barely", 0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "neither", "nor", "cannot", "cant",
    "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "wouldnt",
    "shouldnt", "couldnt", "aint", "hardly",
];

/// Stems left behind when the cleaner splits an `n't` contraction
/// (`don't` becomes `don t`).
const CONTRACTION_STEMS: &[&str] = &[
    "don", "doesn", "didn", "isn", "wasn", "aren", "weren", "won", "wouldn", "shouldn",
    "couldn", "can", "ain", "haven", "hasn", "hadn", "mustn", "needn",
];

/// Word polarities, intensifiers and negations used by the scorer.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
    contraction_stems: HashSet<String>,
}

impl Lexicon {
    /// The built-in general-English lexicon.
    #[must_use]
    pub fn builtin() -> Self {
        let words = POSITIVE
            .iter()
            .chain(NEGATIVE)
            .map(|&(w, s)| (w.to_string(), s))
            .collect();
        let intensifiers = INTENSIFIERS
            .iter()
            .map(|&(w, m)| (w.to_string(), m))
            .collect();
        let negations = NEGATIONS.iter().map(|w| (*w).to_string()).collect();
        let contraction_stems = CONTRACTION_STEMS.iter().map(|w| (*w).to_string()).collect();

        Self {
            words,
            intensifiers,
            negations,
            contraction_stems,
        }
    }

    /// Load the built-in lexicon and merge the entries of a JSON file over it.
    ///
    /// The file is a flat object mapping words to scores in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a JSON object of
    /// numbers, holds a score outside `[-1, 1]`, or scores an intensifier or
    /// negation word (those never reach the polarity lookup).
    pub fn with_overrides(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let lexicon_err = |message: String| Error::LexiconLoad {
            path: path.to_path_buf(),
            message,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| lexicon_err(e.to_string()))?;
        let entries: HashMap<String, f64> =
            serde_json::from_str(&raw).map_err(|e| lexicon_err(e.to_string()))?;

        let mut lexicon = Self::builtin();
        for (word, score) in entries {
            if !(-1.0..=1.0).contains(&score) {
                return Err(lexicon_err(format!(
                    "score for '{word}' must be within [-1, 1], got {score}"
                )));
            }
            let key = word.to_lowercase();
            if lexicon.is_negation(&key) || lexicon.intensifier(&key).is_some() {
                return Err(lexicon_err(format!(
                    "'{word}' is an intensifier or negation and cannot carry a score"
                )));
            }
            lexicon.insert(&word, score);
        }

        debug!(path = %path.display(), words = lexicon.len(), "Loaded lexicon overrides");
        Ok(lexicon)
    }

    /// Add or replace a word's polarity.
    pub fn insert(&mut self, word: &str, score: f64) {
        self.words.insert(word.to_lowercase(), score.clamp(-1.0, 1.0));
    }

    /// Polarity of a word, if it carries one.
    #[must_use]
    pub fn score(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    /// Multiplier of an intensifier word.
    #[must_use]
    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    /// Whether the word negates the next polarity word.
    #[must_use]
    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    /// Whether the word is the first half of a split `n't` contraction.
    #[must_use]
    pub fn is_contraction_stem(&self, word: &str) -> bool {
        self.contraction_stems.contains(word)
    }

    /// Number of polarity words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the lexicon has no polarity words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
