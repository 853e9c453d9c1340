use std::collections::HashMap;

use crate::types::{FieldRef, Predicate, Product, ProductId, SearchHit, TokenQuery};

/// Loads catalog records into an index.
pub trait CatalogIndexer: Send + Sync {
    fn index(&self, products: &[Product]) -> anyhow::Result<()>;
}

/// The catalog query capabilities the search planner consumes.
///
/// Calls are synchronous. Zero matching rows is `Ok` with an empty result;
/// `Err` means the index itself failed.
pub trait CatalogIndex: Send + Sync {
    /// Records matching any `(field, query)` pair, one hit per record, with a
    /// non-negative rank that already accounts for `FieldRef::weight`.
    fn ranked_match(&self, queries: &[(FieldRef, TokenQuery)]) -> anyhow::Result<Vec<SearchHit>>;

    /// Character trigram similarity in `[0, 1]` between `text` and the field
    /// value of every record. Records with zero similarity may be omitted.
    fn similarity(&self, field: FieldRef, text: &str) -> anyhow::Result<HashMap<ProductId, f32>>;

    /// Records whose field value contains `text`, compared case-insensitively.
    fn substring_contains(&self, field: FieldRef, text: &str) -> anyhow::Result<Vec<ProductId>>;

    /// The subset of `ids` satisfying `predicate`.
    fn filter_by_predicate(
        &self,
        ids: &[ProductId],
        predicate: &Predicate,
    ) -> anyhow::Result<Vec<ProductId>>;

    /// Records for `ids`, in the order given. Unknown ids are skipped.
    fn fetch_by_ids(&self, ids: &[ProductId]) -> anyhow::Result<Vec<Product>>;
}
