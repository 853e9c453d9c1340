//! Strategy cascade.
//!
//! ```text
//! Init ─► FullText ──found──► Done
//!  │         │ none
//!  │         ├─ full_text ─► FallbackSubstring ──found──► Done
//!  │         │                     │ none
//!  │         └─ hybrid ────────────┴──► Trigram ─► Done
//!  └─ trigram ────────────────────────► Trigram
//! ```
//!
//! Only emptiness drives a transition. Index errors end the request at the
//! stage that raised them.

use std::collections::HashMap;

use souq_core::config::SearchSettings;
use souq_core::error::{Error, Result};
use souq_core::traits::CatalogIndex;
use souq_core::types::{FieldRef, MatchStage, ProductId, Strategy, TokenQuery};
use tracing::debug;

use crate::merge::{combine_similarity, segment_threshold, ScoredResultSet, SegmentSimilarity};
use crate::segment::Segment;
use crate::token_query::field_queries;

/// Score given to a substring hit on a title field.
const CONTAINMENT_SCORE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    Init,
    FullText,
    FallbackSubstring,
    Trigram,
    Done,
}

impl CascadeState {
    /// Next state after this one ran under `strategy`; `found` says whether
    /// the stage produced at least one candidate.
    pub fn next(self, strategy: Strategy, found: bool) -> CascadeState {
        match (self, strategy) {
            (CascadeState::Init, Strategy::Trigram) => CascadeState::Trigram,
            (CascadeState::Init, _) => CascadeState::FullText,
            (CascadeState::FullText, _) if found => CascadeState::Done,
            (CascadeState::FullText, Strategy::FullText) => CascadeState::FallbackSubstring,
            (CascadeState::FullText, _) => CascadeState::Trigram,
            (CascadeState::FallbackSubstring, _) if found => CascadeState::Done,
            (CascadeState::FallbackSubstring, _) => CascadeState::Trigram,
            (CascadeState::Trigram, _) | (CascadeState::Done, _) => CascadeState::Done,
        }
    }

    pub fn stage(self) -> Option<MatchStage> {
        match self {
            CascadeState::FullText => Some(MatchStage::FullText),
            CascadeState::FallbackSubstring => Some(MatchStage::Substring),
            CascadeState::Trigram => Some(MatchStage::Trigram),
            CascadeState::Init | CascadeState::Done => None,
        }
    }
}

/// Result of one cascade run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutcome {
    pub results: ScoredResultSet,
    /// Stages that ran, in order.
    pub stages: Vec<MatchStage>,
}

impl CascadeOutcome {
    pub fn terminal_stage(&self) -> Option<MatchStage> {
        self.stages.last().copied()
    }
}

pub struct CascadeController<'a, I: CatalogIndex + ?Sized> {
    index: &'a I,
    settings: &'a SearchSettings,
}

impl<'a, I: CatalogIndex + ?Sized> CascadeController<'a, I> {
    pub fn new(index: &'a I, settings: &'a SearchSettings) -> Self {
        Self { index, settings }
    }

    pub fn run(&self, segments: &[Segment], strategy: Strategy) -> Result<CascadeOutcome> {
        let mut state = CascadeState::Init;
        let mut token_queries: Vec<(FieldRef, TokenQuery)> = Vec::new();
        let mut outcome = CascadeOutcome::default();
        while state != CascadeState::Done {
            let found = match state {
                CascadeState::Init => {
                    token_queries =
                        segments.iter().flat_map(|s| field_queries(s, self.settings)).collect();
                    false
                }
                CascadeState::FullText => {
                    outcome.results = self.full_text(&token_queries)?;
                    !outcome.results.is_empty()
                }
                CascadeState::FallbackSubstring => {
                    outcome.results = self.substring(segments)?;
                    !outcome.results.is_empty()
                }
                CascadeState::Trigram => {
                    outcome.results = self.trigram(segments)?;
                    !outcome.results.is_empty()
                }
                CascadeState::Done => break,
            };
            outcome.stages.extend(state.stage());
            let next = state.next(strategy, found);
            debug!(
                from = ?state,
                to = ?next,
                %strategy,
                candidates = outcome.results.len(),
                "cascade transition"
            );
            state = next;
        }
        Ok(outcome)
    }

    /// Ranked prefix match over every language field pairing.
    pub fn full_text(&self, token_queries: &[(FieldRef, TokenQuery)]) -> Result<ScoredResultSet> {
        let queries: Vec<(FieldRef, TokenQuery)> =
            token_queries.iter().filter(|(_, q)| !q.is_empty()).cloned().collect();
        if queries.is_empty() {
            return Ok(ScoredResultSet::empty());
        }
        let hits = self.index.ranked_match(&queries).map_err(Error::Collaborator)?;
        Ok(ScoredResultSet::from_contributions(
            hits.into_iter().map(|h| (h.id, h.score, MatchStage::FullText)),
        ))
    }

    /// Case-insensitive containment of each segment in its language's title.
    pub fn substring(&self, segments: &[Segment]) -> Result<ScoredResultSet> {
        let mut contributions = Vec::new();
        for segment in segments {
            let language = segment.script.language();
            let title = FieldRef::title(language, self.settings.title_weight);
            for id in self.contains(title, &segment.text)? {
                contributions.push((id, CONTAINMENT_SCORE, MatchStage::Substring));
            }
            if self.settings.substring_includes_descriptions {
                let description = FieldRef::description(language, self.settings.description_weight);
                let discount = self.settings.description_discount;
                for id in self.contains(description, &segment.text)? {
                    contributions.push((id, discount, MatchStage::Substring));
                }
            }
        }
        Ok(ScoredResultSet::from_contributions(contributions))
    }

    /// Trigram similarity of each segment against title and description.
    pub fn trigram(&self, segments: &[Segment]) -> Result<ScoredResultSet> {
        let mut per_segment = Vec::with_capacity(segments.len());
        for segment in segments {
            let language = segment.script.language();
            let title = FieldRef::title(language, self.settings.title_weight);
            let description = FieldRef::description(language, self.settings.description_weight);
            per_segment.push(SegmentSimilarity {
                title: self.similar(title, &segment.text)?,
                description: self.similar(description, &segment.text)?,
                threshold: segment_threshold(segment.char_len(), self.settings),
            });
        }
        Ok(combine_similarity(&per_segment, self.settings.description_discount))
    }

    fn contains(&self, field: FieldRef, text: &str) -> Result<Vec<ProductId>> {
        self.index.substring_contains(field, text).map_err(Error::Collaborator)
    }

    fn similar(&self, field: FieldRef, text: &str) -> Result<HashMap<ProductId, f32>> {
        self.index.similarity(field, text).map_err(Error::Collaborator)
    }
}
