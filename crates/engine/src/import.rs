//! Reverse import: remote snapshot to catalog
//!
//! Walks the provider's products and emits a catalog-shaped document, plus
//! the provider ID-mapping artifact recording which remote IDs back each
//! plan. Plan ids come from `plan_code` metadata when present, otherwise
//! from the normalized product name — the same heuristics the matcher uses
//! in the other direction.

use pricebook_catalog::model::{Catalog, Plan, Price, PROVIDER_STRIPE, SCHEMA_VERSION};
use pricebook_catalog::provider_map::{PlanIds, ProviderMap};

use crate::error::EngineResult;
use crate::matcher::normalize_name;
use crate::provider::ProviderGateway;
use crate::snapshot::{fetch_snapshot, RemoteProduct};

/// Catalog plus the ID-mapping side artifact
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub catalog: Catalog,
    pub map: ProviderMap,
}

/// Fetch the remote snapshot and reconstruct a catalog from it
pub async fn import(gateway: &dyn ProviderGateway) -> EngineResult<ImportOutcome> {
    let products = fetch_snapshot(gateway).await?;
    Ok(build_outcome(&products, gateway.environment().as_str()))
}

fn build_outcome(products: &[RemoteProduct], environment: &str) -> ImportOutcome {
    let mut catalog = Catalog {
        version: SCHEMA_VERSION,
        providers: vec![PROVIDER_STRIPE.to_string()],
        ..Catalog::default()
    };
    let mut map = ProviderMap {
        provider: PROVIDER_STRIPE.to_string(),
        environment: environment.to_string(),
        synced_at: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        ..ProviderMap::default()
    };

    for product in products.iter().filter(|p| p.active) {
        let plan_id = product
            .plan_code
            .clone()
            .unwrap_or_else(|| normalize_name(&product.name));

        let mut plan = Plan {
            id: plan_id.clone(),
            name: product.name.clone(),
            ..Plan::default()
        };
        let mut ids = PlanIds {
            product_id: product.id.clone(),
            ..PlanIds::default()
        };

        for price in &product.prices {
            if !price.active || price.interval.is_empty() {
                // One-time prices are not representable as plan intervals
                continue;
            }
            plan.prices.insert(
                price.interval.clone(),
                Price::Flat {
                    amount: price.amount,
                },
            );
            ids.prices.insert(price.interval.clone(), price.id.clone());
        }

        // Only keep plans that have at least one price
        if plan.prices.is_empty() {
            continue;
        }
        catalog.plans.push(plan);
        map.plans.insert(plan_id, ids);
    }

    ImportOutcome { catalog, map }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::RemotePrice;

    fn price(id: &str, interval: &str, amount: i64, active: bool) -> RemotePrice {
        RemotePrice {
            id: id.to_string(),
            interval: interval.to_string(),
            amount,
            currency: "usd".to_string(),
            active,
        }
    }

    #[test]
    fn test_plan_id_from_code_or_normalized_name() {
        let products = vec![
            RemoteProduct {
                id: "prod_1".to_string(),
                name: "Whatever".to_string(),
                plan_code: Some("pro".to_string()),
                billing_model: None,
                active: true,
                prices: vec![price("p1", "monthly", 2900, true)],
            },
            RemoteProduct {
                id: "prod_2".to_string(),
                name: "Team Plan".to_string(),
                plan_code: None,
                billing_model: None,
                active: true,
                prices: vec![price("p2", "monthly", 9900, true)],
            },
        ];
        let outcome = build_outcome(&products, "sandbox");
        let ids: Vec<_> = outcome.catalog.plans.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pro", "team"]);
        assert_eq!(outcome.map.plans["pro"].product_id, "prod_1");
        assert_eq!(outcome.map.plans["pro"].prices["monthly"], "p1");
    }

    #[test]
    fn test_inactive_and_one_time_prices_skipped() {
        let products = vec![RemoteProduct {
            id: "prod_1".to_string(),
            name: "Pro".to_string(),
            plan_code: Some("pro".to_string()),
            billing_model: None,
            active: true,
            prices: vec![
                price("p1", "monthly", 2900, true),
                price("p2", "monthly", 1900, false),
                price("p3", "", 50000, true),
            ],
        }];
        let outcome = build_outcome(&products, "sandbox");
        let plan = &outcome.catalog.plans[0];
        assert_eq!(plan.prices.len(), 1);
        assert_eq!(plan.prices["monthly"], Price::Flat { amount: 2900 });
    }

    #[test]
    fn test_products_without_prices_dropped() {
        let products = vec![
            RemoteProduct {
                id: "prod_1".to_string(),
                name: "Empty".to_string(),
                plan_code: Some("empty".to_string()),
                billing_model: None,
                active: true,
                prices: vec![],
            },
            RemoteProduct {
                id: "prod_2".to_string(),
                name: "Archived".to_string(),
                plan_code: Some("archived".to_string()),
                billing_model: None,
                active: false,
                prices: vec![price("p1", "monthly", 100, true)],
            },
        ];
        let outcome = build_outcome(&products, "sandbox");
        assert!(outcome.catalog.plans.is_empty());
        assert!(outcome.map.plans.is_empty());
    }

    #[test]
    fn test_catalog_header_fields() {
        let outcome = build_outcome(&[], "production");
        assert_eq!(outcome.catalog.version, SCHEMA_VERSION);
        assert_eq!(outcome.catalog.providers, vec!["stripe"]);
        assert_eq!(outcome.map.environment, "production");
        assert!(outcome.map.synced_at.is_some());
    }
}
