use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::Product;

/// Reads catalog records from `*.json` files, each holding an array of products.
#[derive(Default)]
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_directory(&self, catalog_dir: &Path) -> Result<Vec<Product>> {
        let files = self.list_json_files(catalog_dir)?;
        self.load_files(&files)
    }

    pub fn load_directory_limited(&self, catalog_dir: &Path, limit: usize) -> Result<Vec<Product>> {
        let mut files = self.list_json_files(catalog_dir)?;
        if files.len() > limit {
            files.truncate(limit);
            info!(limit, "limited catalog load to first files");
        }
        self.load_files(&files)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<Product>> {
        let raw = fs::read_to_string(file_path)
            .map_err(|e| Error::Operation(format!("reading {}: {}", file_path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Operation(format!("parsing {}: {}", file_path.display(), e)))
    }

    fn load_files(&self, files: &[PathBuf]) -> Result<Vec<Product>> {
        let mut seen = HashSet::new();
        let mut products = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            let batch = self.load_file(file_path)?;
            info!(
                file = %file_path.display(),
                n = file_index + 1,
                of = files.len(),
                records = batch.len(),
                "loaded catalog file"
            );
            for product in batch {
                if seen.insert(product.id) {
                    products.push(product);
                } else {
                    warn!(
                        id = product.id,
                        file = %file_path.display(),
                        "duplicate product id, keeping first occurrence"
                    );
                }
            }
        }
        info!(files = files.len(), products = products.len(), "catalog loaded");
        Ok(products)
    }

    fn list_json_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!("catalog directory {}", root.display())));
        }
        let mut json_files = Vec::new();
        let entries = walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok());
        for entry in entries.filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                json_files.push(path.to_path_buf());
            }
        }
        json_files.sort();
        Ok(json_files)
    }
}
