//! Text cleaner that strips noise tokens from post text.

use regex::Regex;
use tracing::trace;

use super::patterns::builtin_patterns;
use crate::error::{Error, Result};

/// A noise token found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseMatch<'a> {
    /// Name of the pattern that matched.
    pub pattern_name: &'a str,
    /// The matched text.
    pub text: &'a str,
}

/// Strips noise tokens from post text.
///
/// All patterns (custom ones first, then the built-ins) are compiled into a
/// single alternation. Every match is replaced with a space and the result
/// is collapsed to single-space separated words.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    noise: Regex,
    pattern_names: Vec<String>,
}

impl TextCleaner {
    /// Create a cleaner using only the built-in patterns.
    ///
    /// # Panics
    ///
    /// Panics if the built-in patterns fail to compile, which would be a bug.
    #[must_use]
    pub fn new() -> Self {
        Self::with_extra_patterns(&[]).expect("built-in noise patterns compile")
    }

    /// Create a cleaner with extra patterns tried before the built-ins.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any extra pattern is not a valid regex.
    pub fn with_extra_patterns(extra: &[String]) -> Result<Self> {
        for pattern in extra {
            if let Err(e) = Regex::new(pattern) {
                return Err(Error::config_validation(format!(
                    "invalid regex pattern {pattern}: {e}"
                )));
            }
        }

        let mut pattern_names = Vec::with_capacity(extra.len() + builtin_patterns().len());
        let mut sources = Vec::with_capacity(pattern_names.capacity());

        for (i, pattern) in extra.iter().enumerate() {
            pattern_names.push(format!("custom_{i}"));
            sources.push(pattern.as_str());
        }
        for pattern in builtin_patterns() {
            pattern_names.push(pattern.name.to_string());
            sources.push(pattern.pattern);
        }

        let combined = sources
            .iter()
            .enumerate()
            .map(|(i, src)| format!("(?P<p{i}>{src})"))
            .collect::<Vec<_>>()
            .join("|");

        let noise = Regex::new(&combined).map_err(|e| {
            Error::config_validation(format!("noise patterns do not combine: {e}"))
        })?;

        Ok(Self {
            noise,
            pattern_names,
        })
    }

    /// Remove noise tokens and normalise whitespace.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let replaced = self.noise.replace_all(text, " ");
        let cleaned = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
        trace!(before = text.len(), after = cleaned.len(), "Cleaned post text");
        cleaned
    }

    /// List the noise tokens `clean` would remove, in order of appearance.
    #[must_use]
    pub fn noise_tokens<'a>(&'a self, text: &'a str) -> Vec<NoiseMatch<'a>> {
        self.noise
            .captures_iter(text)
            .filter_map(|caps| {
                self.pattern_names.iter().enumerate().find_map(|(i, name)| {
                    caps.name(&format!("p{i}")).map(|m| NoiseMatch {
                        pattern_name: name.as_str(),
                        text: m.as_str(),
                    })
                })
            })
            .collect()
    }

    /// Names of the active patterns, in priority order.
    #[must_use]
    pub fn pattern_names(&self) -> &[String] {
        &self.pattern_names
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
