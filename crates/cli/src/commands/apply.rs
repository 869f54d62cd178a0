//! `apply` — sync the catalog to Stripe
//!
//! With `--dry-run` this is the compare operation; otherwise the reconciler
//! runs and the mutation-count summary is printed with any warnings.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};

use pricebook_catalog::loader;
use pricebook_engine::{report, Environment, Reconciler};

use crate::commands::{diff, gateway, validate_providers};
use crate::output::Output;

pub async fn run(
    file: &Path,
    env: Environment,
    dry_run: bool,
    json: bool,
    out: &Output,
) -> Result<ExitCode> {
    if dry_run {
        return diff::run(file, env, json, out).await;
    }

    let catalog = loader::load_catalog(file).context("failed to load billing config")?;
    validate_providers(&catalog.providers)?;

    let gateway = gateway(env)?;

    out.say(&format!("Syncing billing config to Stripe ({env})..."));

    match Reconciler::new(&gateway).sync(&catalog).await {
        Ok(result) => {
            out.write(&report::render_sync_summary(&result));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            // Applied mutations are not rolled back; show what happened
            // before the failure.
            if let Some(partial) = err.partial() {
                out.write(&report::render_sync_summary(partial));
            }
            Err(anyhow!("sync failed: {err}"))
        }
    }
}
