//! Domain types shared by the planner and catalog index implementations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub type ProductId = u64;
pub type NutritionFacts = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: u64,
    pub name: String,
}

/// A bilingual catalog record.
///
/// - `name_*`/`description_*`: English and Arabic title and description
/// - `nutrition_facts`: numeric attributes keyed by name (`calories`, `protein`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_ar: String,
    pub category: Category,
    pub brand: Brand,
    #[serde(default)]
    pub nutrition_facts: Option<NutritionFacts>,
}

impl Product {
    pub fn field_text(&self, kind: FieldKind, language: Language) -> &str {
        match (kind, language) {
            (FieldKind::Title, Language::English) => &self.name_en,
            (FieldKind::Title, Language::Arabic) => &self.name_ar,
            (FieldKind::Description, Language::English) => &self.description_en,
            (FieldKind::Description, Language::Arabic) => &self.description_ar,
        }
    }

    pub fn nutrient(&self, name: &str) -> Option<f64> {
        self.nutrition_facts.as_ref().and_then(|facts| facts.get(name).copied())
    }
}

/// The two script families a query is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Latin,
    Arabic,
}

impl Script {
    /// Language of the catalog fields a segment of this script is matched against.
    pub fn language(self) -> Language {
        match self {
            Script::Latin => Language::English,
            Script::Arabic => Language::Arabic,
        }
    }

    pub fn language_config(self) -> LanguageConfig {
        match self {
            Script::Latin => LanguageConfig::English,
            Script::Arabic => LanguageConfig::Simple,
        }
    }
}

/// Language a catalog field is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Arabic,
}

/// Linguistic normalization profile forwarded to the token index.
/// `English` stems, `Simple` only lowercases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageConfig {
    English,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    Description,
}

/// A searchable field of a record in one language, with its rank weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    pub kind: FieldKind,
    pub language: Language,
    pub weight: f32,
}

impl FieldRef {
    pub fn new(kind: FieldKind, language: Language, weight: f32) -> Self {
        Self { kind, language, weight }
    }

    pub fn title(language: Language, weight: f32) -> Self {
        Self::new(FieldKind::Title, language, weight)
    }

    pub fn description(language: Language, weight: f32) -> Self {
        Self::new(FieldKind::Description, language, weight)
    }
}

/// A rankable predicate over one field.
///
/// `AnyPrefix` matches a record when any indexed word of the field starts
/// with any of `terms`. `Empty` matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenQuery {
    Empty,
    AnyPrefix { terms: Vec<String>, config: LanguageConfig },
}

impl TokenQuery {
    pub fn is_empty(&self) -> bool {
        match self {
            TokenQuery::Empty => true,
            TokenQuery::AnyPrefix { terms, .. } => terms.is_empty(),
        }
    }

    pub fn terms(&self) -> &[String] {
        match self {
            TokenQuery::Empty => &[],
            TokenQuery::AnyPrefix { terms, .. } => terms,
        }
    }
}

/// Matching strategy requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    FullText,
    Trigram,
    Hybrid,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::FullText => "full_text",
            Strategy::Trigram => "trigram",
            Strategy::Hybrid => "hybrid",
        }
    }

    /// Lenient parse of a caller-supplied hint: absent or unknown names fall
    /// back to `default`.
    pub fn from_hint(hint: Option<&str>, default: Strategy) -> Strategy {
        hint.and_then(|h| h.parse().ok()).unwrap_or(default)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full_text" | "fulltext" => Ok(Strategy::FullText),
            "trigram" => Ok(Strategy::Trigram),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(format!("unknown search strategy '{}'", other)),
        }
    }
}

/// Matching stage that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    FullText,
    Substring,
    Trigram,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchStage::FullText => "full_text",
            MatchStage::Substring => "substring",
            MatchStage::Trigram => "trigram",
        })
    }
}

/// A ranked row returned by the catalog index. Higher `score` is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ProductId,
    pub score: f32,
}

/// A scored record identifier together with every stage that scored it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ProductId,
    pub score: f32,
    pub stages: BTreeSet<MatchStage>,
}

/// A structured predicate evaluated by the catalog index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Case-insensitive substring of the category name.
    CategoryContains(String),
    /// Case-insensitive substring of the brand name.
    BrandContains(String),
    /// Nutrient value at most `max` (inclusive).
    NutrientAtMost { nutrient: String, max: f64 },
    /// Nutrient value at least `min` (inclusive).
    NutrientAtLeast { nutrient: String, min: f64 },
}

impl Predicate {
    /// Reference evaluation of the predicate against one record. A missing
    /// nutrient never satisfies a numeric bound.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::CategoryContains(needle) => {
                contains_ignore_case(&product.category.name, needle)
            }
            Predicate::BrandContains(needle) => contains_ignore_case(&product.brand.name, needle),
            Predicate::NutrientAtMost { nutrient, max } => {
                product.nutrient(nutrient).is_some_and(|v| v <= *max)
            }
            Predicate::NutrientAtLeast { nutrient, min } => {
                product.nutrient(nutrient).is_some_and(|v| v >= *min)
            }
        }
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
