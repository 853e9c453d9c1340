//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `SOUQ_*` env vars.
//! Typed sections (`search`, `data`) fall back to their defaults when absent.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Strategy;

/// Tunables of the search planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results kept after filtering.
    pub result_limit: usize,
    pub title_weight: f32,
    pub description_weight: f32,
    /// Multiplier applied to description similarity in the trigram stage.
    pub description_discount: f32,
    pub long_segment_threshold: f32,
    pub short_segment_threshold: f32,
    /// Segments with at most this many characters use `short_segment_threshold`.
    pub short_segment_max_len: usize,
    pub default_strategy: Strategy,
    /// Also probe description fields in the substring fallback.
    pub substring_includes_descriptions: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            result_limit: 20,
            title_weight: 1.0,
            description_weight: 0.4,
            description_discount: 0.5,
            long_segment_threshold: 0.1,
            short_segment_threshold: 0.05,
            short_segment_max_len: 2,
            default_strategy: Strategy::FullText,
            substring_includes_descriptions: false,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<()> {
        if self.result_limit == 0 {
            return Err(Error::InvalidConfig("search.result_limit must be positive".into()));
        }
        for (name, value) in [
            ("search.description_discount", self.description_discount),
            ("search.long_segment_threshold", self.long_segment_threshold),
            ("search.short_segment_threshold", self.short_segment_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(self.title_weight > 0.0 && self.description_weight > 0.0) {
            return Err(Error::InvalidConfig("search weights must be positive".into()));
        }
        if self.title_weight < self.description_weight {
            return Err(Error::InvalidConfig(format!(
                "search.title_weight ({}) must not be below search.description_weight ({})",
                self.title_weight, self.description_weight
            )));
        }
        Ok(())
    }
}

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub catalog_dir: String,
    /// On-disk index location; `None` keeps the index in RAM.
    pub index_dir: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { catalog_dir: "test_data/catalog".to_string(), index_dir: None }
    }
}

impl DataSettings {
    pub fn catalog_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.catalog_dir)
    }

    pub fn index_dir(&self, base: &Path) -> Option<PathBuf> {
        self.index_dir.as_ref().map(|p| resolve_with_base(base, p))
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("SOUQ_").split("__"));

        Self::from_figment(figment)
    }

    /// Build from an already assembled figment, validating typed sections.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config = Self { figment };
        config.search_settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn search_settings(&self) -> Result<SearchSettings> {
        self.section("search")
    }

    pub fn data_settings(&self) -> Result<DataSettings> {
        self.section("data")
    }

    fn section<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if self.figment.contains(key) {
            self.get(key)
        } else {
            Ok(T::default())
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
