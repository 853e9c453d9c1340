use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use souq_core::error::{Error, Result};
use souq_core::traits::CatalogIndex;
use souq_core::types::Predicate;
use tracing::debug;

use crate::merge::ScoredResultSet;

pub const CALORIES: &str = "calories";
pub const PROTEIN: &str = "protein";

/// Optional structured constraints. `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub max_calories: Option<f64>,
    pub min_protein: Option<f64>,
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parse a numeric bound; anything that is not a finite number counts as absent.
fn parse_bound(name: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!(filter = name, value = raw, "ignoring malformed numeric filter");
            None
        }
    }
}

impl FilterSpec {
    /// Build from raw request parameters.
    pub fn from_params(
        category: Option<&str>,
        brand: Option<&str>,
        max_calories: Option<&str>,
        min_protein: Option<&str>,
    ) -> Self {
        Self {
            category: non_empty(category),
            brand: non_empty(brand),
            max_calories: parse_bound("max_calories", max_calories),
            min_protein: parse_bound("min_protein", min_protein),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(category) = &self.category {
            predicates.push(Predicate::CategoryContains(category.clone()));
        }
        if let Some(brand) = &self.brand {
            predicates.push(Predicate::BrandContains(brand.clone()));
        }
        if let Some(max) = self.max_calories {
            predicates.push(Predicate::NutrientAtMost { nutrient: CALORIES.to_string(), max });
        }
        if let Some(min) = self.min_protein {
            predicates.push(Predicate::NutrientAtLeast { nutrient: PROTEIN.to_string(), min });
        }
        predicates
    }
}

/// Narrow `results` to candidates satisfying every predicate in `filters`.
/// Relative order of survivors is unchanged.
pub fn apply<I>(
    index: &I,
    results: ScoredResultSet,
    filters: &FilterSpec,
) -> Result<ScoredResultSet>
where
    I: CatalogIndex + ?Sized,
{
    apply_predicates(index, results, &filters.predicates())
}

pub fn apply_predicates<I>(
    index: &I,
    mut results: ScoredResultSet,
    predicates: &[Predicate],
) -> Result<ScoredResultSet>
where
    I: CatalogIndex + ?Sized,
{
    if predicates.is_empty() || results.is_empty() {
        return Ok(results);
    }
    let mut survivors = results.ids();
    for predicate in predicates {
        survivors =
            index.filter_by_predicate(&survivors, predicate).map_err(Error::Collaborator)?;
        debug!(?predicate, remaining = survivors.len(), "filter applied");
        if survivors.is_empty() {
            break;
        }
    }
    let keep: HashSet<_> = survivors.into_iter().collect();
    results.retain_ids(&keep);
    Ok(results)
}
