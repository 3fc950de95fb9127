//! Content safety — denylist screening.
//!
//! Stateless apart from the term list fixed at construction. The same filter
//! screens the raw input and the generated output.

use std::collections::HashSet;

/// A denylisted term found in screened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub term: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "content matched denylisted term '{}'", self.term)
    }
}

/// Case-insensitive substring denylist.
#[derive(Debug, Clone)]
pub struct ContentSafetyFilter {
    /// Lower-cased, non-empty terms.
    terms: Vec<String>,
}

impl ContentSafetyFilter {
    /// Build a filter from a list of terms. Blank terms are ignored.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    /// Check `text` against the denylist.
    ///
    /// Returns the first matching term. Empty text never violates.
    pub fn check(&self, text: &str) -> Option<Violation> {
        if text.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .find(|term| lowered.contains(term.as_str()))
            .map(|term| Violation { term: term.clone() })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for ContentSafetyFilter {
    fn default() -> Self {
        Self::new(["bad", "evil"])
    }
}
