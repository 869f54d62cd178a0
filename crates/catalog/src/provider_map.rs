//! Provider ID-mapping artifact
//!
//! Records the provider-side IDs for each plan, addon, and promotion. This
//! is a write-only side artifact produced by `import`; apply and diff never
//! consult it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;

/// Directory name the mapping files live under, next to the catalog
const MAP_DIR: &str = "pricebook";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderMap {
    pub provider: String,
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plans: BTreeMap<String, PlanIds>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub addons: BTreeMap<String, AddonIds>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub promotions: BTreeMap<String, String>,
}

/// Provider IDs for one plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanIds {
    pub product_id: String,
    /// interval -> price id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prices: BTreeMap<String, String>,
}

/// Provider IDs for one addon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddonIds {
    pub product_id: String,
    pub price_id: String,
}

/// Path of the mapping file for a catalog: `<dir>/pricebook/<provider>_<env>.yaml`,
/// or next to the catalog when it already lives inside a `pricebook/` directory.
pub fn provider_map_path(catalog_path: &Path, provider: &str, environment: &str) -> PathBuf {
    let dir = catalog_path.parent().unwrap_or(Path::new("."));
    let file = format!("{provider}_{environment}.yaml");
    if dir.file_name() == Some(std::ffi::OsStr::new(MAP_DIR)) {
        dir.join(file)
    } else {
        dir.join(MAP_DIR).join(file)
    }
}

/// Write the mapping artifact, creating the directory as needed
pub fn save_provider_map(path: impl AsRef<Path>, map: &ProviderMap) -> CatalogResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let content = serde_yaml::to_string(map)?;
    fs::write(path, content)?;
    Ok(())
}
