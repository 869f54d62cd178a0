//! Catalog file loading and saving
//!
//! Format is selected by file extension: `.yaml`/`.yml` or `.json`. Parse
//! failures are fatal; no partial catalog is ever returned.

use std::fs;
use std::path::Path;

use crate::error::{CatalogError, CatalogResult};
use crate::model::Catalog;

/// Load and parse a catalog file into the typed model
pub fn load_catalog(path: impl AsRef<Path>) -> CatalogResult<Catalog> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    match extension(path)?.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "json" => Ok(serde_json::from_str(&content)?),
        other => Err(CatalogError::UnsupportedExtension(other.to_string())),
    }
}

/// Load a catalog file as a raw JSON document for schema validation
pub fn load_document(path: impl AsRef<Path>) -> CatalogResult<serde_json::Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    match extension(path)?.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "json" => Ok(serde_json::from_str(&content)?),
        other => Err(CatalogError::UnsupportedExtension(other.to_string())),
    }
}

/// Serialize a catalog back to disk, format chosen by extension
pub fn save_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> CatalogResult<()> {
    let path = path.as_ref();
    let content = match extension(path)?.as_str() {
        "yaml" | "yml" => serde_yaml::to_string(catalog)?,
        "json" => serde_json::to_string_pretty(catalog)?,
        other => return Err(CatalogError::UnsupportedExtension(other.to_string())),
    };
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

fn extension(path: &Path) -> CatalogResult<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| CatalogError::UnsupportedExtension(String::new()))
}
