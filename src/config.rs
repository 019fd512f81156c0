use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// The lookback window: the set of term identifiers admitted into cleaning.
///
/// Stored on disk as JSON, either a bare array or an object with a `terms` key:
/// ```json
/// { "terms": ["FA16", "WI17", "SP17"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermWindow {
    terms: BTreeSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TermFile {
    Bare(Vec<String>),
    Keyed { terms: Vec<String> },
}

impl TermWindow {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Loads the window from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading term window {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing term window {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let terms = match serde_json::from_str::<TermFile>(content)? {
            TermFile::Bare(terms) | TermFile::Keyed { terms } => terms,
        };
        let window = Self::new(terms);
        anyhow::ensure!(!window.is_empty(), "term window is empty");
        Ok(window)
    }

    /// Two academic years of terms, fall 2015 through summer 2017.
    pub fn default_window() -> Self {
        Self::new([
            "FA15", "WI16", "SP16", "S116", "S216", "S316", "FA16", "WI17", "SP17", "S117", "S217",
            "S317",
        ])
    }

    pub fn admits(&self, term: &str) -> bool {
        self.terms.contains(&term.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}
