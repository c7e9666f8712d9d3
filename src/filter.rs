//! Organization filtering
//!
//! Organizations are in scope when their display name matches any configured
//! pattern. Patterns are regular expressions applied as a search, so `eclipse`
//! matches `eclipse-ee4j`; wrap literal names with [`anchor_exact`] to require
//! the whole name.

use regex::Regex;
use std::fmt;

/// A compiled organization filter pattern
#[derive(Debug, Clone)]
pub struct OrgPattern {
    regex: Regex,
}

impl OrgPattern {
    /// Compile a pattern as supplied, unanchored
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Search semantics: true if the pattern matches anywhere in `name`
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl fmt::Display for OrgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if any pattern matches the display name. An empty set matches nothing.
pub fn matches(display_name: &str, patterns: &[OrgPattern]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(display_name))
}

/// Wrap an organization name as `^name$` so it must match the whole display name.
///
/// The name goes in verbatim: regex syntax inside it keeps its meaning, and a
/// name that is not a valid expression is rejected like any other pattern.
pub fn anchor_exact(name: &str) -> Result<OrgPattern, regex::Error> {
    OrgPattern::new(&format!("^{}$", name))
}

/// [`anchor_exact`] over a list of names, preserving order.
pub fn anchor_exact_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<OrgPattern>, regex::Error> {
    names.iter().map(|name| anchor_exact(name.as_ref())).collect()
}

/// The configured organization filter
#[derive(Debug, Clone, Default)]
pub struct OrgFilter {
    patterns: Vec<OrgPattern>,
}

impl OrgFilter {
    pub fn new(patterns: Vec<OrgPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[OrgPattern] {
        &self.patterns
    }

    pub fn matches(&self, display_name: &str) -> bool {
        matches(display_name, &self.patterns)
    }
}
