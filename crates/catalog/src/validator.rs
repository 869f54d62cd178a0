//! Catalog validation
//!
//! Two passes: structural validation against the embedded JSON Schema, then
//! a semantic pass over the typed model that cross-checks entitlement
//! references. Findings are data, not errors — both passes collect every
//! violation they see.

use std::fmt;

use crate::error::CatalogResult;
use crate::loader;
use crate::model::Catalog;
use crate::schema;

/// One validation finding with a JSON-pointer-like path
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {} ({})", self.path, self.message, detail),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

/// Outcome of a full validation pass
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validate a catalog file: structural pass first, semantic pass once the
/// document parses into the typed model.
pub fn validate_file(path: impl AsRef<std::path::Path>) -> CatalogResult<ValidationReport> {
    let document = loader::load_document(path)?;
    validate_document(&document)
}

/// Validate an already-loaded raw document
pub fn validate_document(document: &serde_json::Value) -> CatalogResult<ValidationReport> {
    let mut errors = schema::structural_errors(document)?;

    // The semantic pass needs the typed model, which only exists once the
    // document is structurally sound.
    if errors.is_empty() {
        match serde_json::from_value::<Catalog>(document.clone()) {
            Ok(catalog) => errors.extend(semantic_errors(&catalog)),
            Err(err) => errors.push(ValidationError {
                path: "(root)".to_string(),
                message: err.to_string(),
                detail: None,
            }),
        }
    }

    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}

/// Cross-check every `limits` and `grants` key against the declared
/// entitlements. A catalog with no entitlements at all skips the check:
/// entitlements are simply not in use.
pub fn semantic_errors(catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if catalog.entitlements.is_empty() {
        return errors;
    }

    for (i, plan) in catalog.plans.iter().enumerate() {
        for key in plan.limits.keys() {
            if !catalog.entitlements.contains_key(key) {
                errors.push(ValidationError {
                    path: format!("/plans/{i}/limits/{key}"),
                    message: format!("undefined entitlement '{key}'"),
                    detail: Some(format!(
                        "plan '{}' references entitlement '{}' which is not defined in the entitlements section",
                        plan.id, key
                    )),
                });
            }
        }
    }

    for (i, addon) in catalog.addons.iter().enumerate() {
        for key in addon.grants.keys() {
            if !catalog.entitlements.contains_key(key) {
                errors.push(ValidationError {
                    path: format!("/addons/{i}/grants/{key}"),
                    message: format!("undefined entitlement '{key}'"),
                    detail: Some(format!(
                        "addon '{}' grants entitlement '{}' which is not defined in the entitlements section",
                        addon.id, key
                    )),
                });
            }
        }
    }

    errors
}
