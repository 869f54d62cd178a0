//! Remote provider snapshot
//!
//! The snapshot is fetched fresh at the start of every compare or sync and
//! discarded afterwards; it is never persisted. It is read-consistent only
//! at fetch time — nothing guards against another actor mutating remote
//! state mid-run.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::provider::ProviderGateway;

/// A provider-side product with its prices
#[derive(Debug, Clone, Default)]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    /// `plan_code` metadata, resolved once at fetch time
    pub plan_code: Option<String>,
    /// `billing_model` metadata: "subscription" or "one_time"
    pub billing_model: Option<String>,
    pub active: bool,
    pub prices: Vec<RemotePrice>,
}

/// A provider-side price
#[derive(Debug, Clone, Default)]
pub struct RemotePrice {
    pub id: String,
    /// "monthly", "quarterly", "yearly", or "" for one-time
    pub interval: String,
    pub amount: i64,
    pub currency: String,
    pub active: bool,
}

/// A provider-side discount coupon (id only; truncate needs nothing more)
#[derive(Debug, Clone)]
pub struct RemoteCoupon {
    pub id: String,
}

/// Fetch all active products with their prices, sequentially. Duplicate
/// active plan codes fail fast here so neither diff nor sync ever picks one
/// of them arbitrarily.
pub async fn fetch_snapshot(gateway: &dyn ProviderGateway) -> EngineResult<Vec<RemoteProduct>> {
    let mut products = gateway.list_products(true).await?;
    for product in &mut products {
        let prices = gateway.list_prices(Some(&product.id), false).await?;
        product.prices = prices;
    }
    check_duplicate_plan_codes(&products)?;
    Ok(products)
}

fn check_duplicate_plan_codes(products: &[RemoteProduct]) -> EngineResult<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for product in products.iter().filter(|p| p.active) {
        if let Some(code) = product.plan_code.as_deref() {
            if let Some(first) = seen.insert(code, product.id.as_str()) {
                return Err(EngineError::DuplicatePlanCode {
                    code: code.to_string(),
                    first: first.to_string(),
                    second: product.id.clone(),
                });
            }
        }
    }
    Ok(())
}
