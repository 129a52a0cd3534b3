//! Built-in noise patterns.
//!
//! Order matters: the patterns are combined into a single leftmost-first
//! alternation, so at any position an earlier pattern wins over a later one.

/// A named regex describing one kind of noise token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoisePattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// Description of what this pattern matches.
    pub description: &'static str,

    /// The regex source.
    pub pattern: &'static str,
}

const BUILTIN: &[NoisePattern] = &[
    NoisePattern {
        name: "mention",
        description: "@mentions of other accounts",
        pattern: r"@[A-Za-z0-9]+",
    },
    NoisePattern {
        name: "non_alphanumeric",
        description: "Any character other than ASCII letters, digits, space and tab",
        pattern: r"[^0-9A-Za-z \t]",
    },
    NoisePattern {
        name: "url",
        description: "Links of the form scheme://rest",
        pattern: r"\w+://\S+",
    },
];

/// Get all built-in noise patterns, in match priority order.
#[must_use]
pub fn builtin_patterns() -> &'static [NoisePattern] {
    BUILTIN
}
