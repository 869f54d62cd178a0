//! Read-only catalog-to-remote comparison
//!
//! Produces a structured report of per-plan and per-price status plus
//! aggregate counts. Status is computed bottom-up: any missing or differing
//! price forces the plan to DIFFERS; a plan with no product match at all is
//! MISSING. Plans not targeting the provider are silently skipped.

use std::fmt;

use serde::Serialize;

use pricebook_catalog::model::{Catalog, Plan, PROVIDER_STRIPE};

use crate::matcher::match_product;
use crate::snapshot::{RemotePrice, RemoteProduct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "DIFFERS")]
    Differs,
    #[serde(rename = "MISSING")]
    Missing,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffStatus::Ok => f.write_str("OK"),
            DiffStatus::Differs => f.write_str("DIFFERS"),
            DiffStatus::Missing => f.write_str("MISSING"),
        }
    }
}

/// The comparison report for one invocation
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    pub environment: String,
    pub compared_at: String,
    pub plans: Vec<PlanDiff>,
    pub summary: Summary,
}

impl DiffResult {
    /// Drives the exit-code contract: true iff anything is missing or differs
    pub fn has_differences(&self) -> bool {
        self.summary.missing + self.summary.differs > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanDiff {
    pub plan_id: String,
    pub plan_name: String,
    pub status: DiffStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<PriceDiff>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceDiff {
    pub interval: String,
    pub local_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_amount: Option<i64>,
    pub status: DiffStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Summary {
    pub total: u32,
    pub synced: u32,
    pub missing: u32,
    pub differs: u32,
}

/// Compare the local catalog with the remote snapshot
pub fn compare(catalog: &Catalog, products: &[RemoteProduct], environment: &str) -> DiffResult {
    let mut result = DiffResult {
        environment: environment.to_string(),
        compared_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        plans: Vec::with_capacity(catalog.plans.len()),
        summary: Summary::default(),
    };

    for plan in &catalog.plans {
        if !plan.targets_provider(PROVIDER_STRIPE, &catalog.providers) {
            continue;
        }
        let plan_diff = compare_plan(plan, products);
        match plan_diff.status {
            DiffStatus::Ok => result.summary.synced += 1,
            DiffStatus::Missing => result.summary.missing += 1,
            DiffStatus::Differs => result.summary.differs += 1,
        }
        result.summary.total += 1;
        result.plans.push(plan_diff);
    }

    result
}

fn compare_plan(plan: &Plan, products: &[RemoteProduct]) -> PlanDiff {
    let Some(product) = match_product(products, &plan.id, &plan.name) else {
        return PlanDiff {
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            status: DiffStatus::Missing,
            details: "Not in Stripe".to_string(),
            prices: Vec::new(),
        };
    };

    let mut prices = Vec::with_capacity(plan.prices.len());
    let mut differ_details = Vec::new();

    for (interval, local_price) in &plan.prices {
        let local_amount = local_price.amount();
        let price_diff = match find_active_price(&product.prices, interval) {
            None => {
                differ_details.push(format!("{interval}: missing in Stripe"));
                PriceDiff {
                    interval: interval.clone(),
                    local_amount,
                    remote_amount: None,
                    status: DiffStatus::Missing,
                }
            }
            Some(remote) if remote.amount == local_amount => PriceDiff {
                interval: interval.clone(),
                local_amount,
                remote_amount: Some(remote.amount),
                status: DiffStatus::Ok,
            },
            Some(remote) => {
                differ_details.push(format!(
                    "{interval}: local={local_amount} stripe={}",
                    remote.amount
                ));
                PriceDiff {
                    interval: interval.clone(),
                    local_amount,
                    remote_amount: Some(remote.amount),
                    status: DiffStatus::Differs,
                }
            }
        };
        prices.push(price_diff);
    }

    let (status, details) = if differ_details.is_empty() {
        (DiffStatus::Ok, String::new())
    } else {
        (DiffStatus::Differs, differ_details.join(", "))
    };

    PlanDiff {
        plan_id: plan.id.clone(),
        plan_name: plan.name.clone(),
        status,
        details,
        prices,
    }
}

fn find_active_price<'a>(prices: &'a [RemotePrice], interval: &str) -> Option<&'a RemotePrice> {
    prices.iter().find(|p| p.interval == interval && p.active)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::RemoteProduct;

    fn catalog(yaml: &str) -> Catalog {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn remote_price(interval: &str, amount: i64, active: bool) -> RemotePrice {
        RemotePrice {
            id: format!("price_{interval}_{amount}"),
            interval: interval.to_string(),
            amount,
            currency: "usd".to_string(),
            active,
        }
    }

    fn remote_product(code: &str, name: &str, prices: Vec<RemotePrice>) -> RemoteProduct {
        RemoteProduct {
            id: format!("prod_{code}"),
            name: name.to_string(),
            plan_code: Some(code.to_string()),
            billing_model: None,
            active: true,
            prices,
        }
    }

    const ONE_PLAN: &str = "version: 1\nproviders: [stripe]\nplans:\n  - id: pro\n    name: Pro\n    prices:\n      monthly: {amount: 2900}\n      yearly: {amount: 29000}\n";

    #[test]
    fn test_fully_synced_plan_is_ok() {
        let products = vec![remote_product(
            "pro",
            "Pro",
            vec![
                remote_price("monthly", 2900, true),
                remote_price("yearly", 29000, true),
            ],
        )];
        let result = compare(&catalog(ONE_PLAN), &products, "sandbox");
        assert_eq!(result.plans[0].status, DiffStatus::Ok);
        assert_eq!(result.summary.synced, 1);
        assert!(!result.has_differences());
    }

    #[test]
    fn test_missing_plan_reported() {
        let result = compare(&catalog(ONE_PLAN), &[], "sandbox");
        assert_eq!(result.plans.len(), 1);
        assert_eq!(result.plans[0].status, DiffStatus::Missing);
        assert_eq!(result.plans[0].details, "Not in Stripe");
        assert!(result.plans[0].prices.is_empty());
        assert_eq!(result.summary.total, 1);
        assert_eq!(result.summary.missing, 1);
        assert!(result.has_differences());
    }

    #[test]
    fn test_differing_amount_reported_with_both_values() {
        let products = vec![remote_product(
            "pro",
            "Pro",
            vec![
                remote_price("monthly", 1900, true),
                remote_price("yearly", 29000, true),
            ],
        )];
        let result = compare(&catalog(ONE_PLAN), &products, "sandbox");
        let plan = &result.plans[0];
        assert_eq!(plan.status, DiffStatus::Differs);
        assert!(plan.details.contains("monthly: local=2900 stripe=1900"));
        assert_eq!(result.summary.differs, 1);
    }

    #[test]
    fn test_missing_price_forces_differs() {
        let products = vec![remote_product(
            "pro",
            "Pro",
            vec![remote_price("monthly", 2900, true)],
        )];
        let result = compare(&catalog(ONE_PLAN), &products, "sandbox");
        let plan = &result.plans[0];
        assert_eq!(plan.status, DiffStatus::Differs);
        assert!(plan.details.contains("yearly: missing in Stripe"));
        let yearly = plan.prices.iter().find(|p| p.interval == "yearly").unwrap();
        assert_eq!(yearly.status, DiffStatus::Missing);
        assert_eq!(yearly.remote_amount, None);
    }

    #[test]
    fn test_archived_price_does_not_satisfy_comparison() {
        // An inactive price with the right amount still counts as missing
        let products = vec![remote_product(
            "pro",
            "Pro",
            vec![
                remote_price("monthly", 2900, false),
                remote_price("yearly", 29000, true),
            ],
        )];
        let result = compare(&catalog(ONE_PLAN), &products, "sandbox");
        assert_eq!(result.plans[0].status, DiffStatus::Differs);
        assert!(result.plans[0].details.contains("monthly: missing in Stripe"));
    }

    #[test]
    fn test_plans_not_targeting_provider_are_skipped() {
        let cat = catalog(
            "version: 1\nproviders: [stripe]\nplans:\n  - id: pro\n    name: Pro\n    prices:\n      monthly: {amount: 2900}\n  - id: internal\n    name: Internal\n    providers: [paddle]\n    prices:\n      monthly: {amount: 100}\n",
        );
        let products = vec![remote_product(
            "pro",
            "Pro",
            vec![remote_price("monthly", 2900, true)],
        )];
        let result = compare(&cat, &products, "sandbox");
        assert_eq!(result.plans.len(), 1);
        assert_eq!(result.summary.total, 1);
    }
}
