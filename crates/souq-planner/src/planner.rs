use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use souq_core::config::SearchSettings;
use souq_core::error::{Error, Result};
use souq_core::traits::CatalogIndex;
use souq_core::types::{MatchStage, Product, Strategy};
use tracing::info;

use crate::cascade::CascadeController;
use crate::filter::{self, FilterSpec};
use crate::merge::ScoredResultSet;
use crate::segment::segment;

/// One search call: raw query, optional strategy hint, optional filters.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub strategy: Option<Strategy>,
    pub filters: FilterSpec,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Filtered and truncated candidates.
    pub results: ScoredResultSet,
    pub strategy: Strategy,
    /// Cascade stages that ran, in order.
    pub stages: Vec<MatchStage>,
}

/// A hydrated result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub score: f32,
    pub matched_by: BTreeSet<MatchStage>,
}

pub struct SearchPlanner<I: CatalogIndex> {
    index: I,
    settings: SearchSettings,
}

impl<I: CatalogIndex> SearchPlanner<I> {
    pub fn new(index: I, settings: SearchSettings) -> Self {
        Self { index, settings }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Plan and run `request`: segment, cascade, filter, truncate.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(Error::InvalidQuery("Please provide a search query".to_string()));
        }
        let strategy = request.strategy.unwrap_or(self.settings.default_strategy);
        let segments = segment(query).segments();

        let cascade = CascadeController::new(&self.index, &self.settings).run(&segments, strategy)?;
        let terminal = cascade.terminal_stage();
        let unfiltered = cascade.results.len();
        let mut results = filter::apply(&self.index, cascade.results, &request.filters)?;
        results.truncate(self.settings.result_limit);

        info!(
            %strategy,
            segments = segments.len(),
            terminal = ?terminal,
            candidates = unfiltered,
            returned = results.len(),
            "search planned"
        );
        Ok(SearchOutcome { results, strategy, stages: cascade.stages })
    }

    /// Search, then fetch the records in ranked order.
    pub fn search_products(&self, request: &SearchRequest) -> Result<Vec<RankedProduct>> {
        let outcome = self.search(request)?;
        let products =
            self.index.fetch_by_ids(&outcome.results.ids()).map_err(Error::Collaborator)?;
        let mut by_id: HashMap<_, _> = products.into_iter().map(|p| (p.id, p)).collect();
        Ok(outcome
            .results
            .into_vec()
            .into_iter()
            .filter_map(|c| {
                let product = by_id.remove(&c.id)?;
                Some(RankedProduct { product, score: c.score, matched_by: c.stages })
            })
            .collect())
    }
}
