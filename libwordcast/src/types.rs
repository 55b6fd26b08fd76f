//! Core types for Wordcast

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Normalize a word for storage and comparison
///
/// Surrounding whitespace is dropped and the word is lowercased, so history
/// lookups are case-insensitive. Applying it twice changes nothing.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A word together with its meaning and an example sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTriple {
    pub word: String,
    pub meaning: String,
    pub example: String,
}

impl WordTriple {
    pub fn new(
        word: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            example: example.into(),
        }
    }

    /// The normalized form of the word, as it is recorded in the history
    pub fn entry(&self) -> String {
        normalize(&self.word)
    }
}

/// Words already posted, in the order they were posted
///
/// Entries are always normalized and never repeated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    words: Vec<String>,
    seen: HashSet<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word, returning `false` if it was already present
    pub fn insert(&mut self, word: &str) -> bool {
        let entry = normalize(word);
        if entry.is_empty() || self.seen.contains(&entry) {
            return false;
        }
        self.seen.insert(entry.clone());
        self.words.push(entry);
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.seen.contains(&normalize(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }
}

impl<S: AsRef<str>> FromIterator<S> for History {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut history = History::new();
        for word in iter {
            history.insert(word.as_ref());
        }
        history
    }
}

/// A file fetched from a remote content API
///
/// `sha` is the revision tag that must accompany the next update of the
/// same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    pub sha: String,
}
