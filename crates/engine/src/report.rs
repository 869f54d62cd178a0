//! Report rendering
//!
//! Formats differ and reconciler outputs as a human-readable table or a
//! machine-readable JSON document.

use std::fmt::Write as _;

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::differ::{DiffResult, DiffStatus};
use crate::reconciler::SyncResult;
use crate::truncate::TruncateResult;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "PLAN")]
    plan: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAILS")]
    details: String,
}

/// Render the diff result as a table with a summary line
pub fn render_diff_table(result: &DiffResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Environment: {}", result.environment);
    let _ = writeln!(out, "Compared at: {}", result.compared_at);
    out.push('\n');

    let rows: Vec<PlanRow> = result
        .plans
        .iter()
        .map(|plan| PlanRow {
            plan: plan.plan_id.clone(),
            status: format_status(plan.status),
            details: plan.details.clone(),
        })
        .collect();
    out.push_str(&Table::new(rows).with(Style::blank()).to_string());
    out.push('\n');

    let _ = writeln!(
        out,
        "\nSummary: {} total, {} synced, {} missing, {} differs",
        result.summary.total,
        result.summary.synced,
        result.summary.missing,
        result.summary.differs,
    );
    out
}

/// Render the diff result as pretty JSON
pub fn render_diff_json(result: &DiffResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Render warnings and the mutation-count summary of an apply run
pub fn render_sync_summary(result: &SyncResult) -> String {
    let mut out = String::new();
    for warning in &result.warnings {
        let _ = writeln!(out, "  {} {}", "WARNING:".yellow(), warning);
    }
    let _ = writeln!(
        out,
        "Done. Products: {} created. Prices: {} created, {} archived. Addons: {}. Coupons: {}. Promo codes: {}.",
        result.products_created,
        result.prices_created,
        result.prices_archived,
        result.addons_created,
        result.coupons_created,
        result.promos_created,
    );
    out
}

/// Render the truncate summary line
pub fn render_truncate_summary(result: &TruncateResult) -> String {
    format!(
        "Done. Archived {} prices, {} products. Deleted {} coupons.\n",
        result.prices_archived, result.products_archived, result.coupons_deleted,
    )
}

fn format_status(status: DiffStatus) -> String {
    let label = format!("[{status}]");
    match status {
        DiffStatus::Ok => label.green().to_string(),
        DiffStatus::Differs => label.yellow().to_string(),
        DiffStatus::Missing => label.red().to_string(),
    }
}
