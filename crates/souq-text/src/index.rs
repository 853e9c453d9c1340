use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};
use tracing::{debug, info};

use souq_core::traits::{CatalogIndex, CatalogIndexer};
use souq_core::types::{
    FieldKind, FieldRef, Language, LanguageConfig, Predicate, Product, ProductId, SearchHit,
    TokenQuery,
};

use crate::tantivy_utils::{build_schema, register_tokenizers, tokenizer_name, CatalogFields};
use crate::trigram::TrigramSet;

/// Upper bound on indexed words a single prefix expands to.
pub const MAX_PREFIX_EXPANSIONS: usize = 256;

struct Entry {
    product: Product,
    title_en: TrigramSet,
    description_en: TrigramSet,
    title_ar: TrigramSet,
    description_ar: TrigramSet,
}

impl Entry {
    fn new(product: Product) -> Self {
        Self {
            title_en: TrigramSet::from_text(&product.name_en),
            description_en: TrigramSet::from_text(&product.description_en),
            title_ar: TrigramSet::from_text(&product.name_ar),
            description_ar: TrigramSet::from_text(&product.description_ar),
            product,
        }
    }

    fn trigrams(&self, field: FieldRef) -> &TrigramSet {
        match (field.kind, field.language) {
            (FieldKind::Title, Language::English) => &self.title_en,
            (FieldKind::Description, Language::English) => &self.description_en,
            (FieldKind::Title, Language::Arabic) => &self.title_ar,
            (FieldKind::Description, Language::Arabic) => &self.description_ar,
        }
    }
}

/// Catalog index over a tantivy index plus the records it was built from.
pub struct TantivyCatalog {
    index: Index,
    reader: IndexReader,
    fields: CatalogFields,
    records: RwLock<BTreeMap<ProductId, Entry>>,
}

impl TantivyCatalog {
    pub fn in_memory() -> Result<Self> {
        Self::with_index(Index::create_in_ram(build_schema()))
    }

    /// Create a fresh on-disk index, replacing anything already at `index_dir`.
    pub fn create_in_dir(index_dir: PathBuf) -> Result<Self> {
        if index_dir.exists() {
            std::fs::remove_dir_all(&index_dir)?;
        }
        std::fs::create_dir_all(&index_dir)?;
        Self::with_index(Index::create_in_dir(&index_dir, build_schema())?)
    }

    pub fn from_products(products: &[Product]) -> Result<Self> {
        let catalog = Self::in_memory()?;
        catalog.index(products)?;
        Ok(catalog)
    }

    fn with_index(index: Index) -> Result<Self> {
        register_tokenizers(&index);
        let fields = CatalogFields::from_schema(&index.schema())?;
        let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
        Ok(Self { index, reader, fields, records: RwLock::new(BTreeMap::new()) })
    }

    pub fn len(&self) -> usize {
        self.records().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ProductId, Entry>>> {
        self.records.read().map_err(|_| anyhow!("catalog records lock poisoned"))
    }

    /// Run `text` through the analyzer selected by `config`.
    fn analyze(&self, text: &str, config: LanguageConfig) -> Result<Vec<String>> {
        let name = tokenizer_name(config);
        let mut analyzer = self
            .index
            .tokenizers()
            .get(name)
            .ok_or_else(|| anyhow!("tokenizer '{}' not registered", name))?;
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    /// Indexed words of `field` starting with `prefix`, across all segments,
    /// at most [`MAX_PREFIX_EXPANSIONS`] of them.
    fn expand_prefix(searcher: &Searcher, field: Field, prefix: &str) -> Result<BTreeSet<String>> {
        let mut words = BTreeSet::new();
        for segment_reader in searcher.segment_readers() {
            let inverted_index = segment_reader.inverted_index(field)?;
            let mut stream = inverted_index.terms().range().ge(prefix.as_bytes()).into_stream()?;
            // terms stream in sorted order, so later ones of this segment cannot make the cut
            let mut taken = 0;
            while taken <= MAX_PREFIX_EXPANSIONS && stream.advance() {
                let key = stream.key();
                if !key.starts_with(prefix.as_bytes()) {
                    break;
                }
                if let Ok(word) = std::str::from_utf8(key) {
                    words.insert(word.to_string());
                    taken += 1;
                }
            }
        }
        if words.len() > MAX_PREFIX_EXPANSIONS {
            debug!(
                prefix,
                matched = words.len(),
                kept = MAX_PREFIX_EXPANSIONS,
                "prefix expansion truncated"
            );
            words = words.into_iter().take(MAX_PREFIX_EXPANSIONS).collect();
        }
        Ok(words)
    }
}

impl CatalogIndexer for TantivyCatalog {
    fn index(&self, products: &[Product]) -> Result<()> {
        let mut index_writer: IndexWriter = self.index.writer(50_000_000)?;
        let f = self.fields;
        for p in products {
            index_writer.delete_term(Term::from_field_u64(f.id, p.id));
            index_writer.add_document(doc!(
                f.id => p.id,
                f.title_en => p.name_en.clone(),
                f.description_en => p.description_en.clone(),
                f.title_ar => p.name_ar.clone(),
                f.description_ar => p.description_ar.clone(),
            ))?;
        }
        index_writer.commit()?;
        self.reader.reload()?;

        let mut records =
            self.records.write().map_err(|_| anyhow!("catalog records lock poisoned"))?;
        for p in products {
            records.insert(p.id, Entry::new(p.clone()));
        }
        info!(indexed = products.len(), total = records.len(), "catalog indexed");
        Ok(())
    }
}

impl CatalogIndex for TantivyCatalog {
    fn ranked_match(&self, queries: &[(FieldRef, TokenQuery)]) -> Result<Vec<SearchHit>> {
        let searcher = self.reader.searcher();
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for (field_ref, token_query) in queries {
            let TokenQuery::AnyPrefix { terms, config } = token_query else {
                continue;
            };
            let field = self.fields.text_field(*field_ref);
            // each prefix gets its own expansion budget
            let mut words = BTreeSet::new();
            for term in terms {
                for prefix in self.analyze(term, *config)? {
                    words.extend(Self::expand_prefix(&searcher, field, &prefix)?);
                }
            }
            debug!(
                field = ?field_ref.kind,
                language = ?field_ref.language,
                terms = terms.len(),
                expansions = words.len(),
                "prefix expansion"
            );
            for word in words {
                let term = Term::from_field_text(field, &word);
                let term_query = TermQuery::new(term, IndexRecordOption::WithFreqs);
                let boosted = BoostQuery::new(Box::new(term_query), field_ref.weight);
                clauses.push((Occur::Should, Box::new(boosted)));
            }
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let query = BooleanQuery::new(clauses);
        let limit = (searcher.num_docs() as usize).max(1);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| anyhow!("indexed document without id"))?;
            hits.push(SearchHit { id, score });
        }
        Ok(hits)
    }

    fn similarity(&self, field: FieldRef, text: &str) -> Result<HashMap<ProductId, f32>> {
        let query = TrigramSet::from_text(text);
        let records = self.records()?;
        Ok(records
            .values()
            .filter_map(|e| {
                let score = query.similarity(e.trigrams(field));
                (score > 0.0).then_some((e.product.id, score))
            })
            .collect())
    }

    fn substring_contains(&self, field: FieldRef, text: &str) -> Result<Vec<ProductId>> {
        let needle = text.to_lowercase();
        let records = self.records()?;
        Ok(records
            .values()
            .filter(|e| {
                e.product.field_text(field.kind, field.language).to_lowercase().contains(&needle)
            })
            .map(|e| e.product.id)
            .collect())
    }

    fn filter_by_predicate(
        &self,
        ids: &[ProductId],
        predicate: &Predicate,
    ) -> Result<Vec<ProductId>> {
        let records = self.records()?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| records.get(id).is_some_and(|e| predicate.matches(&e.product)))
            .collect())
    }

    fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let records = self.records()?;
        Ok(ids.iter().filter_map(|id| records.get(id).map(|e| e.product.clone())).collect())
    }
}
