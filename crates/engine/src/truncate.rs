//! Sandbox reset engine
//!
//! Bulk-archives every active price and product, then hard-deletes every
//! coupon. Prices go first — they cannot be cleaned up after their product
//! is archived. This is a destructive bulk operation and refuses to run
//! against anything but a sandbox credential, before any remote call is
//! made.

use thiserror::Error;

use crate::error::{EngineError, EngineResult};
use crate::provider::{Environment, ProviderGateway};

/// Aggregate counts for one truncate run
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncateResult {
    pub prices_archived: u32,
    pub products_archived: u32,
    pub coupons_deleted: u32,
}

/// Truncate failure; partial counts travel with the error, nothing is
/// rolled back.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct TruncateError {
    pub partial: TruncateResult,
    #[source]
    pub source: EngineError,
}

/// Archive all prices, then all products, then delete all coupons.
pub async fn truncate(gateway: &dyn ProviderGateway) -> Result<TruncateResult, TruncateError> {
    let mut result = TruncateResult::default();

    if gateway.environment() != Environment::Sandbox {
        return Err(TruncateError {
            partial: result,
            source: EngineError::TruncateForbidden(gateway.environment()),
        });
    }

    if let Err(source) = run(gateway, &mut result).await {
        return Err(TruncateError {
            partial: result,
            source,
        });
    }
    Ok(result)
}

async fn run(gateway: &dyn ProviderGateway, result: &mut TruncateResult) -> EngineResult<()> {
    // Prices before products
    for price in gateway.list_prices(None, true).await? {
        gateway.deactivate_price(&price.id).await?;
        result.prices_archived += 1;
    }
    tracing::info!(count = result.prices_archived, "archived prices");

    for product in gateway.list_products(true).await? {
        gateway.deactivate_product(&product.id).await?;
        result.products_archived += 1;
    }
    tracing::info!(count = result.products_archived, "archived products");

    for coupon in gateway.list_coupons().await? {
        gateway.delete_coupon(&coupon.id).await?;
        result.coupons_deleted += 1;
    }
    tracing::info!(count = result.coupons_deleted, "deleted coupons");

    Ok(())
}
