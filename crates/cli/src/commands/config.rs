//! `config` — persisted CLI preferences

use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use pricebook_catalog::settings;

use crate::ConfigCommands;

pub fn run(action: ConfigCommands) -> Result<ExitCode> {
    match action {
        ConfigCommands::Set { key, value } => {
            let mut current = settings::load_settings().context("failed to load settings")?;
            match key.as_str() {
                "quiet" => {
                    current.quiet = matches!(value.as_str(), "true" | "1" | "yes");
                }
                other => bail!("unknown config key: {other} (available: quiet)"),
            }
            settings::save_settings(&current).context("failed to save settings")?;
            println!("Set {key} = {value}");
        }
        ConfigCommands::Get { key } => {
            let current = settings::load_settings().context("failed to load settings")?;
            match key.as_str() {
                "quiet" => println!("{}", current.quiet),
                other => bail!("unknown config key: {other} (available: quiet)"),
            }
        }
        ConfigCommands::List => {
            let current = settings::load_settings().context("failed to load settings")?;
            println!("quiet = {}", current.quiet);
        }
        ConfigCommands::Path => {
            println!("{}", settings::settings_path().display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
