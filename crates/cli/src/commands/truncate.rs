//! `truncate` — reset the Stripe sandbox
//!
//! Destructive bulk operation: archives every product and price and deletes
//! every coupon. Only a sandbox credential is accepted, and an interactive
//! confirmation guards the run unless `--confirm` is passed.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use anyhow::{anyhow, Result};

use pricebook_engine::{report, truncate, Environment};

use crate::commands::gateway;
use crate::output::Output;

pub async fn run(confirm: bool, out: &Output) -> Result<ExitCode> {
    // Confirmation is always interactive, even in quiet mode
    if !confirm {
        println!(
            "WARNING: This will archive ALL products, prices, and delete coupons in your Stripe sandbox account."
        );
        print!("Are you sure? [y/N]: ");
        std::io::stdout().flush()?;

        let mut response = String::new();
        std::io::stdin().lock().read_line(&mut response)?;
        if !is_affirmative(&response) {
            println!("Aborted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    // Only the sandbox credential is ever read
    let gateway = gateway(Environment::Sandbox)?;

    out.say("Archiving all products, prices, and deleting coupons in sandbox...");

    match truncate(&gateway).await {
        Ok(result) => {
            out.write(&report::render_truncate_summary(&result));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            out.write(&report::render_truncate_summary(&err.partial));
            Err(anyhow!("truncate failed: {err}"))
        }
    }
}

fn is_affirmative(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}
