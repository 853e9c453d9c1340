#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use souq_core::traits::CatalogIndex;
use souq_core::types::{
    Brand, Category, FieldKind, FieldRef, Language, Predicate, Product, ProductId, SearchHit,
    TokenQuery,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RankedMatch(Vec<(FieldRef, TokenQuery)>),
    Similarity(FieldKind, Language, String),
    Substring(FieldKind, Language, String),
    Filter(Vec<ProductId>, Predicate),
    Fetch(Vec<ProductId>),
}

/// In-memory catalog index with canned answers and a call log.
#[derive(Default)]
pub struct MockIndex {
    pub products: Vec<Product>,
    /// Hits returned for each language present in a ranked match.
    pub ranked: HashMap<Language, Vec<SearchHit>>,
    pub similarity: HashMap<(FieldKind, Language), HashMap<ProductId, f32>>,
    pub substring: HashMap<(FieldKind, Language), Vec<ProductId>>,
    /// Fail every call of this kind ("ranked", "similarity", "substring", "filter", "fetch").
    pub fail_on: Option<&'static str>,
    calls: Mutex<Vec<Call>>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn ranked(mut self, language: Language, hits: &[(ProductId, f32)]) -> Self {
        let hits = hits.iter().map(|&(id, score)| SearchHit { id, score }).collect();
        self.ranked.insert(language, hits);
        self
    }

    pub fn similar(
        mut self,
        kind: FieldKind,
        language: Language,
        scores: &[(ProductId, f32)],
    ) -> Self {
        self.similarity.insert((kind, language), scores.iter().copied().collect());
        self
    }

    pub fn contains(mut self, kind: FieldKind, language: Language, ids: &[ProductId]) -> Self {
        self.substring.insert((kind, language), ids.to_vec());
        self
    }

    pub fn failing(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| call_kind(c) == kind).count()
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        let kind = call_kind(&call);
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(kind) {
            anyhow::bail!("catalog index unavailable during {}", kind);
        }
        Ok(())
    }
}

pub fn call_kind(call: &Call) -> &'static str {
    match call {
        Call::RankedMatch(_) => "ranked",
        Call::Similarity(..) => "similarity",
        Call::Substring(..) => "substring",
        Call::Filter(..) => "filter",
        Call::Fetch(_) => "fetch",
    }
}

impl CatalogIndex for MockIndex {
    fn ranked_match(&self, queries: &[(FieldRef, TokenQuery)]) -> anyhow::Result<Vec<SearchHit>> {
        self.record(Call::RankedMatch(queries.to_vec()))?;
        let mut languages: Vec<Language> = queries.iter().map(|(f, _)| f.language).collect();
        languages.sort();
        languages.dedup();
        Ok(languages.iter().flat_map(|l| self.ranked.get(l).cloned().unwrap_or_default()).collect())
    }

    fn similarity(&self, field: FieldRef, text: &str) -> anyhow::Result<HashMap<ProductId, f32>> {
        self.record(Call::Similarity(field.kind, field.language, text.to_string()))?;
        Ok(self.similarity.get(&(field.kind, field.language)).cloned().unwrap_or_default())
    }

    fn substring_contains(&self, field: FieldRef, text: &str) -> anyhow::Result<Vec<ProductId>> {
        self.record(Call::Substring(field.kind, field.language, text.to_string()))?;
        Ok(self.substring.get(&(field.kind, field.language)).cloned().unwrap_or_default())
    }

    fn filter_by_predicate(
        &self,
        ids: &[ProductId],
        predicate: &Predicate,
    ) -> anyhow::Result<Vec<ProductId>> {
        self.record(Call::Filter(ids.to_vec(), predicate.clone()))?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| self.products.iter().any(|p| p.id == *id && predicate.matches(p)))
            .collect())
    }

    fn fetch_by_ids(&self, ids: &[ProductId]) -> anyhow::Result<Vec<Product>> {
        self.record(Call::Fetch(ids.to_vec()))?;
        Ok(ids
            .iter()
            .filter_map(|id| self.products.iter().find(|p| p.id == *id).cloned())
            .collect())
    }
}

pub fn product(
    id: ProductId,
    category: &str,
    brand: &str,
    calories: Option<f64>,
    protein: Option<f64>,
) -> Product {
    let mut facts = std::collections::BTreeMap::new();
    if let Some(c) = calories {
        facts.insert("calories".to_string(), c);
    }
    if let Some(p) = protein {
        facts.insert("protein".to_string(), p);
    }
    Product {
        id,
        name_en: format!("Product {}", id),
        name_ar: format!("منتج {}", id),
        description_en: String::new(),
        description_ar: String::new(),
        category: Category { id: 1, name: category.to_string() },
        brand: Brand { id: 1, name: brand.to_string() },
        nutrition_facts: if facts.is_empty() { None } else { Some(facts) },
    }
}
