//! Candidate scoring and merging.
//!
//! A record reached by several sub-queries keeps one entry whose score is the
//! maximum any contribution gave it. Scores are never summed.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use souq_core::config::SearchSettings;
use souq_core::types::{Candidate, MatchStage, ProductId};

/// Candidates unique by id, ordered by descending score then ascending id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoredResultSet(Vec<Candidate>);

/// Ranking order: higher score first, lower id breaks ties.
pub fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

impl ScoredResultSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge `(id, score, stage)` contributions, keeping the maximum score per id.
    pub fn from_contributions(
        contributions: impl IntoIterator<Item = (ProductId, f32, MatchStage)>,
    ) -> Self {
        let mut by_id: HashMap<ProductId, Candidate> = HashMap::new();
        for (id, score, stage) in contributions {
            by_id
                .entry(id)
                .and_modify(|c| {
                    if score > c.score {
                        c.score = score;
                    }
                    c.stages.insert(stage);
                })
                .or_insert_with(|| Candidate { id, score, stages: BTreeSet::from([stage]) });
        }
        let mut merged: Vec<Candidate> = by_id.into_values().collect();
        merged.sort_by(rank_order);
        Self(merged)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.0
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.0.iter().map(|c| c.id).collect()
    }

    pub fn score_of(&self, id: ProductId) -> Option<f32> {
        self.0.iter().find(|c| c.id == id).map(|c| c.score)
    }

    /// Keep only candidates whose id is in `keep`; survivors stay in order.
    pub fn retain_ids(&mut self, keep: &HashSet<ProductId>) {
        self.0.retain(|c| keep.contains(&c.id));
    }

    /// Drop candidates scoring at or below `threshold`.
    pub fn retain_above(&mut self, threshold: f32) {
        self.0.retain(|c| c.score > threshold);
    }

    pub fn truncate(&mut self, limit: usize) {
        self.0.truncate(limit);
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ScoredResultSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Admission threshold for a segment of `char_len` characters.
pub fn segment_threshold(char_len: usize, settings: &SearchSettings) -> f32 {
    if char_len <= settings.short_segment_max_len {
        settings.short_segment_threshold
    } else {
        settings.long_segment_threshold
    }
}

/// Similarity scores gathered for one segment.
#[derive(Debug, Clone, Default)]
pub struct SegmentSimilarity {
    pub title: HashMap<ProductId, f32>,
    pub description: HashMap<ProductId, f32>,
    pub threshold: f32,
}

impl SegmentSimilarity {
    /// Per-record best of title similarity and discounted description similarity.
    pub fn best_scores(
        &self,
        description_discount: f32,
    ) -> impl Iterator<Item = (ProductId, f32)> + '_ {
        let ids: BTreeSet<ProductId> =
            self.title.keys().chain(self.description.keys()).copied().collect();
        ids.into_iter().map(move |id| {
            let title = self.title.get(&id).copied().unwrap_or(0.0);
            let description =
                self.description.get(&id).copied().unwrap_or(0.0) * description_discount;
            (id, title.max(description))
        })
    }
}

/// Combine per-segment similarity into one result set.
///
/// A record's score is the greatest of its segment maxima. The admission bar
/// is the most permissive segment threshold; records at or below it are dropped.
pub fn combine_similarity(
    segments: &[SegmentSimilarity],
    description_discount: f32,
) -> ScoredResultSet {
    let Some(threshold) = segments.iter().map(|s| s.threshold).min_by(f32::total_cmp) else {
        return ScoredResultSet::empty();
    };
    let mut merged = ScoredResultSet::from_contributions(
        segments
            .iter()
            .flat_map(|s| s.best_scores(description_discount))
            .map(|(id, score)| (id, score, MatchStage::Trigram)),
    );
    merged.retain_above(threshold);
    merged
}
