use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED,
};
use tantivy::tokenizer::{
    Language as StemLanguage, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer,
};
use tantivy::Index;

use souq_core::types::{FieldKind, FieldRef, Language, LanguageConfig};

pub const ENGLISH_TOKENIZER: &str = "souq_english";
pub const SIMPLE_TOKENIZER: &str = "souq_simple";

pub fn tokenizer_name(config: LanguageConfig) -> &'static str {
    match config {
        LanguageConfig::English => ENGLISH_TOKENIZER,
        LanguageConfig::Simple => SIMPLE_TOKENIZER,
    }
}

fn language_config(language: Language) -> LanguageConfig {
    match language {
        Language::English => LanguageConfig::English,
        Language::Arabic => LanguageConfig::Simple,
    }
}

fn text_options(language: Language) -> TextOptions {
    let indexing = TextFieldIndexing::default()
        .set_tokenizer(tokenizer_name(language_config(language)))
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    TextOptions::default().set_indexing_options(indexing)
}

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    let _id_field = schema_builder.add_u64_field("id", INDEXED | STORED | FAST);
    let _title_en = schema_builder.add_text_field("name_en", text_options(Language::English));
    let _description_en =
        schema_builder.add_text_field("description_en", text_options(Language::English));
    let _title_ar = schema_builder.add_text_field("name_ar", text_options(Language::Arabic));
    let _description_ar =
        schema_builder.add_text_field("description_ar", text_options(Language::Arabic));
    schema_builder.build()
}

pub fn register_tokenizers(index: &Index) {
    let english = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .filter(Stemmer::new(StemLanguage::English))
        .build();
    let simple = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(ENGLISH_TOKENIZER, english);
    index.tokenizers().register(SIMPLE_TOKENIZER, simple);
}

/// Handles to the catalog schema fields.
#[derive(Debug, Clone, Copy)]
pub struct CatalogFields {
    pub id: Field,
    pub title_en: Field,
    pub description_en: Field,
    pub title_ar: Field,
    pub description_ar: Field,
}

impl CatalogFields {
    pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            id: schema.get_field("id")?,
            title_en: schema.get_field("name_en")?,
            description_en: schema.get_field("description_en")?,
            title_ar: schema.get_field("name_ar")?,
            description_ar: schema.get_field("description_ar")?,
        })
    }

    pub fn text_field(&self, field: FieldRef) -> Field {
        match (field.kind, field.language) {
            (FieldKind::Title, Language::English) => self.title_en,
            (FieldKind::Description, Language::English) => self.description_en,
            (FieldKind::Title, Language::Arabic) => self.title_ar,
            (FieldKind::Description, Language::Arabic) => self.description_ar,
        }
    }
}
