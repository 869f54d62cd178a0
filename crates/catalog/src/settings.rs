//! Persisted CLI settings

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "is_false")]
    pub quiet: bool,
}

/// Default settings location: `~/.pricebook/config.yaml`
pub fn settings_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".pricebook").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from(".pricebook.yaml"))
}

pub fn load_settings() -> CatalogResult<Settings> {
    load_settings_from(&settings_path())
}

/// Missing file means defaults, not an error
pub fn load_settings_from(path: &Path) -> CatalogResult<Settings> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_yaml::from_str(&content)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(err.into()),
    }
}

pub fn save_settings(settings: &Settings) -> CatalogResult<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> CatalogResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(path, serde_yaml::to_string(settings)?)?;
    Ok(())
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings =
            load_settings_from(Path::new("/nonexistent/pricebook/config.yaml")).unwrap();
        assert!(!settings.quiet);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("pricebook-settings-{}", std::process::id()));
        let path = dir.join("config.yaml");
        save_settings_to(&path, &Settings { quiet: true }).unwrap();
        let settings = load_settings_from(&path).unwrap();
        assert!(settings.quiet);
    }
}
