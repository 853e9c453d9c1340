use std::fs;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use tempfile::TempDir;

use souq_core::catalog_loader::CatalogLoader;
use souq_core::config::{resolve_with_base, Config, SearchSettings};
use souq_core::error::Error;
use souq_core::types::{Brand, Category, Predicate, Product, Strategy};

fn product(id: u64, name_en: &str, category: &str, calories: Option<f64>) -> Product {
    Product {
        id,
        name_en: name_en.to_string(),
        name_ar: String::new(),
        description_en: String::new(),
        description_ar: String::new(),
        category: Category { id: 1, name: category.to_string() },
        brand: Brand { id: 1, name: "Acme Foods".to_string() },
        nutrition_facts: calories.map(|c| [("calories".to_string(), c)].into_iter().collect()),
    }
}

fn write_catalog(dir: &Path, name: &str, products: &[Product]) {
    fs::write(dir.join(name), serde_json::to_string(products).unwrap()).unwrap();
}

#[test]
fn load_directory_reads_every_json_file() {
    let tmp = TempDir::new().unwrap();
    write_catalog(tmp.path(), "a.json", &[product(1, "Oats", "Grains", None)]);
    fs::create_dir(tmp.path().join("nested")).unwrap();
    write_catalog(&tmp.path().join("nested"), "b.json", &[product(2, "Milk", "Dairy", Some(60.0))]);
    fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

    let products = CatalogLoader::new().load_directory(tmp.path()).expect("load");

    let ids: Vec<u64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn load_directory_keeps_first_duplicate() {
    let tmp = TempDir::new().unwrap();
    write_catalog(tmp.path(), "a.json", &[product(7, "First", "Snacks", None)]);
    write_catalog(tmp.path(), "b.json", &[product(7, "Second", "Snacks", None)]);

    let products = CatalogLoader::new().load_directory(tmp.path()).expect("load");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name_en, "First");
}

#[test]
fn load_directory_limited_one_file() {
    let tmp = TempDir::new().unwrap();
    write_catalog(tmp.path(), "a.json", &[product(1, "Oats", "Grains", None)]);
    write_catalog(tmp.path(), "b.json", &[product(2, "Milk", "Dairy", None)]);

    let products =
        CatalogLoader::new().load_directory_limited(tmp.path(), 1).expect("load limited");

    assert_eq!(products.len(), 1, "limited to one catalog file");
    assert_eq!(products[0].id, 1);
}

#[test]
fn load_directory_missing_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = CatalogLoader::new().load_directory(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {:?}", err);
}

#[test]
fn load_file_reports_malformed_json() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    let err = CatalogLoader::new().load_file(&path).unwrap_err();
    assert!(matches!(err, Error::Operation(_)));
}

#[test]
fn product_deserializes_without_optional_fields() {
    let raw = r#"[{"id": 3, "name_en": "Dates", "name_ar": "تمر",
                  "category": {"id": 2, "name": "Fruits"}, "brand": {"id": 4, "name": "Oasis"}}]"#;
    let products: Vec<Product> = serde_json::from_str(raw).unwrap();
    assert_eq!(products[0].description_en, "");
    assert!(products[0].nutrition_facts.is_none());
}

#[test]
fn search_settings_default_when_section_missing() {
    let config = Config::from_figment(Figment::new()).expect("config");
    assert_eq!(config.search_settings().unwrap(), SearchSettings::default());
    assert_eq!(config.search_settings().unwrap().result_limit, 20);
}

#[test]
fn search_settings_partial_override() {
    let figment = Figment::new().merge(Toml::string(
        r#"
        [search]
        result_limit = 5
        default_strategy = "hybrid"
        "#,
    ));
    let settings = Config::from_figment(figment).unwrap().search_settings().unwrap();
    assert_eq!(settings.result_limit, 5);
    assert_eq!(settings.default_strategy, Strategy::Hybrid);
    assert_eq!(settings.long_segment_threshold, 0.1);
}

#[test]
fn invalid_threshold_rejected() {
    let figment = Figment::new().merge(Toml::string("[search]\nlong_segment_threshold = 1.5\n"));
    let err = Config::from_figment(figment).err().expect("should fail validation");
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn description_outweighing_title_rejected() {
    let settings =
        SearchSettings { title_weight: 0.2, description_weight: 0.4, ..SearchSettings::default() };
    assert!(settings.validate().is_err());
}

#[test]
fn data_settings_resolve_relative_to_base() {
    let toml = "[data]\ncatalog_dir = \"catalog\"\nindex_dir = \"/var/souq/index\"\n";
    let figment = Figment::new().merge(Toml::string(toml));
    let data = Config::from_figment(figment).unwrap().data_settings().unwrap();
    let base = Path::new("/srv/app");
    assert_eq!(data.catalog_dir(base), base.join("catalog"));
    assert_eq!(data.index_dir(base), Some(Path::new("/var/souq/index").to_path_buf()));
    assert_eq!(resolve_with_base(base, "/abs"), Path::new("/abs").to_path_buf());
}

#[test]
fn strategy_hint_falls_back_to_default() {
    assert_eq!(Strategy::from_hint(Some("hybrid"), Strategy::FullText), Strategy::Hybrid);
    assert_eq!(Strategy::from_hint(Some("TRIGRAM"), Strategy::FullText), Strategy::Trigram);
    assert_eq!(Strategy::from_hint(Some("semantic"), Strategy::FullText), Strategy::FullText);
    assert_eq!(Strategy::from_hint(None, Strategy::Hybrid), Strategy::Hybrid);
    assert!("semantic".parse::<Strategy>().is_err());
}

#[test]
fn predicates_match_case_insensitively_and_inclusively() {
    let p = product(1, "Granola Bar", "Healthy Snacks", Some(100.0));
    assert!(Predicate::CategoryContains("snacks".into()).matches(&p));
    assert!(Predicate::BrandContains("ACME".into()).matches(&p));
    assert!(Predicate::NutrientAtMost { nutrient: "calories".into(), max: 100.0 }.matches(&p));
    assert!(!Predicate::NutrientAtMost { nutrient: "calories".into(), max: 99.5 }.matches(&p));
    assert!(!Predicate::NutrientAtLeast { nutrient: "protein".into(), min: 0.0 }.matches(&p));
}

#[test]
fn collaborator_error_display_is_unchanged() {
    let err = Error::Collaborator(anyhow::anyhow!("connection refused"));
    assert_eq!(err.to_string(), "connection refused");
    assert!(!err.is_user_error());
    assert!(Error::InvalidQuery("empty".into()).is_user_error());
}
