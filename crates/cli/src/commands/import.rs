//! `import` — reconstruct a catalog from live Stripe state
//!
//! Writes the catalog file plus the provider ID-mapping artifact recording
//! the remote IDs backing each plan.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use pricebook_catalog::model::PROVIDER_STRIPE;
use pricebook_catalog::{loader, provider_map};
use pricebook_engine::{import, Environment};

use crate::commands::gateway;
use crate::output::Output;

pub async fn run(env: Environment, output: &Path, out: &Output) -> Result<ExitCode> {
    let gateway = gateway(env)?;

    out.say(&format!("Importing from Stripe ({env})..."));

    let outcome = import(&gateway).await.context("import failed")?;

    loader::save_catalog(output, &outcome.catalog).context("failed to save file")?;

    let map_path = provider_map::provider_map_path(output, PROVIDER_STRIPE, env.as_str());
    provider_map::save_provider_map(&map_path, &outcome.map)
        .context("failed to save provider map")?;

    out.say(&format!(
        "Imported {} plans to {}",
        outcome.catalog.plans.len(),
        output.display()
    ));
    out.say(&format!("Provider IDs written to {}", map_path.display()));

    Ok(ExitCode::SUCCESS)
}
