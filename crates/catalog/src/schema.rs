//! Structural catalog validation against the embedded JSON Schema
//!
//! Every violation is enumerated with its JSON-pointer instance path; the
//! pass never stops at the first finding.

use crate::error::{CatalogError, CatalogResult};
use crate::validator::ValidationError;

/// The embedded billing catalog schema
pub const BILLING_SCHEMA: &str = include_str!("../schema/billing.schema.json");

/// Validate a raw catalog document, returning one entry per violation
pub fn structural_errors(document: &serde_json::Value) -> CatalogResult<Vec<ValidationError>> {
    let schema: serde_json::Value = serde_json::from_str(BILLING_SCHEMA)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| CatalogError::Schema(err.to_string()))?;

    Ok(validator
        .iter_errors(document)
        .map(|err| {
            let path = err.instance_path.to_string();
            ValidationError {
                path: if path.is_empty() { "(root)".to_string() } else { path },
                message: err.to_string(),
                detail: None,
            }
        })
        .collect())
}
