//! `diff` — read-only comparison against live Stripe state
//!
//! Exit codes: 0 when in sync, 1 when differences exist, 2 on error. The
//! two non-zero conditions are distinct so CI can tell drift from failure.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use pricebook_catalog::loader;
use pricebook_engine::snapshot::fetch_snapshot;
use pricebook_engine::{compare, report, Environment};

use crate::commands::{gateway, validate_providers};
use crate::output::Output;

pub async fn run(file: &Path, env: Environment, json: bool, out: &Output) -> Result<ExitCode> {
    let catalog = loader::load_catalog(file).context("failed to load billing config")?;
    validate_providers(&catalog.providers)?;

    let gateway = gateway(env)?;
    let products = fetch_snapshot(&gateway)
        .await
        .context("failed to fetch from Stripe")?;

    let result = compare(&catalog, &products, env.as_str());

    if json {
        // Machine-readable output ignores quiet mode
        println!("{}", report::render_diff_json(&result)?);
    } else {
        out.write(&report::render_diff_table(&result));
    }

    Ok(if result.has_differences() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
