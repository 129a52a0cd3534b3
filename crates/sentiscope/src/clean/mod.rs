//! Noise stripping for post text.
//!
//! Posts carry a lot of tokens that mean nothing to a sentiment scorer:
//! `@mentions`, links, emoji and punctuation. This module removes them
//! before scoring and before the text lands in the exported table.
//!
//! # Example
//!
//! ```
//! use sentiscope::clean::TextCleaner;
//!
//! let cleaner = TextCleaner::new();
//! assert_eq!(
//!     cleaner.clean("@bob I love this! https://t.co/x"),
//!     "I love this"
//! );
//! ```

mod cleaner;
mod patterns;

pub use cleaner::{NoiseMatch, TextCleaner};
pub use patterns::{builtin_patterns, NoisePattern};
