//! Catalog error types

use thiserror::Error;

/// Errors raised while loading, saving, or validating catalog files
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read file: {0}")]
    Io(String),

    #[error("unsupported file extension: {0} (use .yaml, .yml, or .json)")]
    UnsupportedExtension(String),

    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
