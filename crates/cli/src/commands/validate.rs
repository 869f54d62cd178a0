//! `validate` — structural + semantic catalog validation

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use pricebook_catalog::validator;

use crate::output::Output;

pub fn run(file: &Path, out: &Output) -> Result<ExitCode> {
    let report = validator::validate_file(file)?;

    if report.valid {
        out.say(&format!("✓ {} is valid", file.display()));
        return Ok(ExitCode::SUCCESS);
    }

    // Findings are always shown, even in quiet mode
    println!(
        "✗ {} has {} validation error(s):\n",
        file.display(),
        report.errors.len()
    );
    for (i, error) in report.errors.iter().enumerate() {
        println!("  {}. {error}", i + 1);
    }
    println!();

    Ok(ExitCode::from(1))
}
