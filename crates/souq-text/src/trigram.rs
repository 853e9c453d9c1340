//! Character trigram similarity.
//!
//! Text is lowercased and split into words on non-alphanumeric characters.
//! Each word is padded with two leading blanks and one trailing blank before
//! its trigrams are taken, so word starts weigh more than word ends. The
//! similarity of two strings is the Jaccard index of their trigram sets.

use std::collections::HashSet;

pub type Trigram = [char; 3];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrigramSet(HashSet<Trigram>);

impl TrigramSet {
    pub fn from_text(text: &str) -> Self {
        let mut set = HashSet::new();
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut padded = vec![' ', ' '];
            padded.extend(word.chars().flat_map(char::to_lowercase));
            padded.push(' ');
            for w in padded.windows(3) {
                set.insert([w[0], w[1], w[2]]);
            }
        }
        Self(set)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shared trigrams over distinct trigrams, in `[0, 1]`.
    pub fn similarity(&self, other: &TrigramSet) -> f32 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let common = self.0.intersection(&other.0).count();
        let union = self.len() + other.len() - common;
        common as f32 / union as f32
    }
}

pub fn similarity(a: &str, b: &str) -> f32 {
    TrigramSet::from_text(a).similarity(&TrigramSet::from_text(b))
}
