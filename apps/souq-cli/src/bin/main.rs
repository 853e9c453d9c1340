use std::env;
use std::path::PathBuf;

use souq_core::catalog_loader::CatalogLoader;
use souq_core::config::Config;
use souq_core::error::Error;
use souq_core::traits::CatalogIndexer;
use souq_core::types::{Product, Strategy};
use souq_planner::{FilterSpec, SearchPlanner, SearchRequest};
use souq_text::TantivyCatalog;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: souq <search|index> [args...]
  search <query> [--strategy full_text|trigram|hybrid] [--category NAME] [--brand NAME]
                 [--max-calories N] [--min-protein N] [--catalog DIR]
  index [--catalog DIR] [--limit N]";

#[derive(Default)]
struct SearchArgs {
    query: Option<String>,
    strategy: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    max_calories: Option<String>,
    min_protein: Option<String>,
    catalog: Option<PathBuf>,
    limit: Option<usize>,
}

fn usage_exit(msg: &str) -> ! {
    eprintln!("Error: {}\n{}", msg, USAGE);
    std::process::exit(2)
}

fn parse_args(args: &[String]) -> SearchArgs {
    let mut parsed = SearchArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .unwrap_or_else(|| usage_exit(&format!("{} requires a value", flag)))
        };
        match flag {
            "--strategy" | "-s" => parsed.strategy = Some(value()),
            "--category" => parsed.category = Some(value()),
            "--brand" => parsed.brand = Some(value()),
            "--max-calories" => parsed.max_calories = Some(value()),
            "--min-protein" => parsed.min_protein = Some(value()),
            "--catalog" => parsed.catalog = Some(PathBuf::from(value())),
            "--limit" => {
                let raw = value();
                let limit = raw.parse().unwrap_or_else(|_| usage_exit("--limit requires a number"));
                parsed.limit = Some(limit);
            }
            _ if !flag.starts_with('-') && parsed.query.is_none() => {
                parsed.query = Some(flag.to_string())
            }
            _ => usage_exit(&format!("unexpected argument '{}'", flag)),
        }
        i += 1;
    }
    parsed
}

fn load_products(config: &Config, args: &SearchArgs) -> anyhow::Result<Vec<Product>> {
    let base = env::current_dir()?;
    let catalog_dir = match &args.catalog {
        Some(dir) => dir.clone(),
        None => config.data_settings()?.catalog_dir(&base),
    };
    let loader = CatalogLoader::new();
    let products = match args.limit {
        Some(limit) => loader.load_directory_limited(&catalog_dir, limit)?,
        None => loader.load_directory(&catalog_dir)?,
    };
    info!(catalog = %catalog_dir.display(), products = products.len(), "catalog loaded");
    Ok(products)
}

fn open_catalog(config: &Config, products: &[Product]) -> anyhow::Result<TantivyCatalog> {
    let base = env::current_dir()?;
    let catalog = match config.data_settings()?.index_dir(&base) {
        Some(dir) => {
            info!(index = %dir.display(), "building on-disk index");
            TantivyCatalog::create_in_dir(dir)?
        }
        None => TantivyCatalog::in_memory()?,
    };
    catalog.index(products)?;
    Ok(catalog)
}

fn run_search(config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let settings = config.search_settings()?;
    let query = args.query.clone().unwrap_or_default();
    let strategy = Strategy::from_hint(args.strategy.as_deref(), settings.default_strategy);
    let filters = FilterSpec::from_params(
        args.category.as_deref(),
        args.brand.as_deref(),
        args.max_calories.as_deref(),
        args.min_protein.as_deref(),
    );

    let products = load_products(config, &args)?;
    let planner = SearchPlanner::new(open_catalog(config, &products)?, settings);
    let request = SearchRequest::new(query).with_strategy(strategy).with_filters(filters);
    let rows = planner.search_products(&request)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn run_index(config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let products = load_products(config, &args)?;
    let catalog = open_catalog(config, &products)?;
    println!("{}", serde_json::json!({ "indexed": catalog.len() }));
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage_exit("missing command");
    }
    let cmd = args.remove(0);
    let parsed = parse_args(&args);

    let result = Config::load().map_err(anyhow::Error::from).and_then(|config| match cmd.as_str() {
        "search" => run_search(&config, parsed),
        "index" => run_index(&config, parsed),
        _ => usage_exit(&format!("unknown command '{}'", cmd)),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let user_error = e.downcast_ref::<Error>().is_some_and(Error::is_user_error);
        std::process::exit(if user_error { 2 } else { 1 });
    }
}
