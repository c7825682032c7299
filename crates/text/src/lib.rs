//! Text helpers shared by the barcode resolver and the classifier.
//!
//! Provides pure functions for:
//! - Case folding
//! - Namespace stripping for tagged codes
//! - Order-preserving deduplication

use std::collections::HashSet;

/// Fold text for case-insensitive matching.
///
/// Unicode-aware, so Cyrillic and other non-ASCII keywords fold too.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Strip a namespace prefix (`en:e471` -> `e471`).
///
/// Everything up to and including the first colon is removed. Text
/// without a colon is returned unchanged.
pub fn strip_namespace(tag: &str) -> &str {
    match tag.split_once(':') {
        Some((_, rest)) => rest,
        None => tag,
    }
}

/// Check that `s` is non-empty and made only of ASCII digits.
pub fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// An ordered list of strings that silently drops repeats.
///
/// Insertion order of first occurrence is preserved; the list is never
/// sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupList {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl DedupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` unless an equal string is already present.
    ///
    /// Returns `true` if the item was added.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &str) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl<S: Into<String>> Extend<S> for DedupList {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for DedupList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl From<DedupList> for Vec<String> {
    fn from(list: DedupList) -> Self {
        list.into_vec()
    }
}
