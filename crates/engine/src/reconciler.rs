//! Sync engine
//!
//! Aligns remote provider state with the catalog: creates missing products
//! and prices, archives conflicting flat prices, creates coupons and
//! promotion codes. Mutations are performed one at a time with no rollback;
//! a failure aborts the remaining loop and the partial result travels with
//! the error. Ambiguous situations (name drift, price conflicts, resources
//! that already exist) become warnings, never failures — a sync that only
//! produced warnings is a successful sync.

use std::fmt;

use thiserror::Error;

use pricebook_catalog::model::{
    Addon, Catalog, Plan, Price, Promotion, PromoDuration, Tier, TierBound, PROVIDER_STRIPE,
};

use crate::error::{EngineError, EngineResult};
use crate::matcher::match_product;
use crate::provider::{
    Cadence, CouponSpec, CouponTerm, CreateOutcome, PriceBilling, PriceSpec, ProductSpec,
    ProviderGateway, TierSpec,
};
use crate::snapshot::{fetch_snapshot, RemotePrice, RemoteProduct};

/// Accumulated mutation counts and warnings for one sync run
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    pub products_created: u32,
    pub prices_created: u32,
    pub prices_archived: u32,
    pub addons_created: u32,
    pub coupons_created: u32,
    pub promos_created: u32,
    pub warnings: Vec<String>,
}

impl SyncResult {
    /// Total remote mutations performed (warnings excluded)
    pub fn mutations(&self) -> u32 {
        self.products_created
            + self.prices_created
            + self.prices_archived
            + self.addons_created
            + self.coupons_created
            + self.promos_created
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Plan,
    Addon,
    Promotion,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Plan => f.write_str("plan"),
            EntityKind::Addon => f.write_str("addon"),
            EntityKind::Promotion => f.write_str("promotion"),
        }
    }
}

/// Sync failure. Mutations already applied are not rolled back; the
/// `Entity` variant carries the partial result accumulated so far.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch existing products: {0}")]
    Fetch(#[from] EngineError),

    #[error("failed to sync {kind} '{id}': {source}")]
    Entity {
        kind: EntityKind,
        id: String,
        partial: SyncResult,
        #[source]
        source: EngineError,
    },
}

impl SyncError {
    /// The partial result accumulated before the failure
    pub fn partial(&self) -> Option<&SyncResult> {
        match self {
            SyncError::Fetch(_) => None,
            SyncError::Entity { partial, .. } => Some(partial),
        }
    }
}

/// The reconciliation engine for one provider gateway
pub struct Reconciler<'a> {
    gateway: &'a dyn ProviderGateway,
}

impl<'a> Reconciler<'a> {
    pub fn new(gateway: &'a dyn ProviderGateway) -> Self {
        Self { gateway }
    }

    /// Create or update everything the catalog describes. The remote
    /// snapshot is fetched once up front; concurrent remote changes during
    /// the run are not detected.
    pub async fn sync(&self, catalog: &Catalog) -> Result<SyncResult, SyncError> {
        let products = fetch_snapshot(self.gateway).await?;
        let mut result = SyncResult::default();

        for plan in &catalog.plans {
            if !plan.targets_provider(PROVIDER_STRIPE, &catalog.providers) {
                continue;
            }
            if let Err(source) = self.sync_plan(plan, &products, &mut result).await {
                return Err(SyncError::Entity {
                    kind: EntityKind::Plan,
                    id: plan.id.clone(),
                    partial: result,
                    source,
                });
            }
        }

        for addon in &catalog.addons {
            if let Err(source) = self.sync_addon(addon, &products, &mut result).await {
                return Err(SyncError::Entity {
                    kind: EntityKind::Addon,
                    id: addon.id.clone(),
                    partial: result,
                    source,
                });
            }
        }

        for promo in &catalog.promotions {
            if let Err(source) = self.sync_promotion(promo, &mut result).await {
                return Err(SyncError::Entity {
                    kind: EntityKind::Promotion,
                    id: promo.code.clone(),
                    partial: result,
                    source,
                });
            }
        }

        Ok(result)
    }

    async fn sync_plan(
        &self,
        plan: &Plan,
        products: &[RemoteProduct],
        result: &mut SyncResult,
    ) -> EngineResult<()> {
        let existing = match_product(products, &plan.id, &plan.name);

        let (product_id, existing_prices): (String, &[RemotePrice]) = match existing {
            Some(product) => {
                // Local name changes never propagate automatically
                if product.name != plan.name {
                    let warning = format!(
                        "plan '{}': product name differs (local='{}', stripe='{}'), not updating",
                        plan.id, plan.name, product.name
                    );
                    tracing::warn!(
                        plan = %plan.id,
                        local = %plan.name,
                        stripe = %product.name,
                        "product name differs"
                    );
                    result.warnings.push(warning);
                }
                (product.id.clone(), product.prices.as_slice())
            }
            None => {
                let spec = product_spec_for_plan(plan);
                let id = self.gateway.create_product(&spec).await?;
                tracing::info!(plan = %plan.id, product = %id, "created product");
                result.products_created += 1;
                (id, &[][..])
            }
        };

        for (interval, price) in &plan.prices {
            self.sync_price(&product_id, plan, interval, price, existing_prices, result)
                .await?;
        }

        Ok(())
    }

    async fn sync_price(
        &self,
        product_id: &str,
        plan: &Plan,
        interval: &str,
        price: &Price,
        existing: &[RemotePrice],
        result: &mut SyncResult,
    ) -> EngineResult<()> {
        let cadence = Cadence::from_interval(interval)?;
        let trial_days = (plan.trial_days > 0 && cadence.is_recurring()).then_some(plan.trial_days);

        let billing = match price {
            Price::Flat { amount } => {
                // Idempotent: an active price at the exact amount is a no-op
                if existing
                    .iter()
                    .any(|p| p.interval == interval && p.active && p.amount == *amount)
                {
                    return Ok(());
                }

                // Conflicting active price: warn, archive, then recreate
                for conflict in existing
                    .iter()
                    .filter(|p| p.interval == interval && p.active && p.amount != *amount)
                {
                    let warning = format!(
                        "plan '{}' {}: price differs (local={}, stripe={}), archiving old and creating new",
                        plan.id, interval, amount, conflict.amount
                    );
                    tracing::warn!(
                        plan = %plan.id,
                        interval = %interval,
                        local = *amount,
                        stripe = conflict.amount,
                        "price conflict, archiving old price"
                    );
                    result.warnings.push(warning);
                    self.gateway.deactivate_price(&conflict.id).await?;
                    result.prices_archived += 1;
                }

                PriceBilling::Flat { amount: *amount }
            }
            // Per-unit prices are recreated on every run: there is no
            // conflict detection against existing per-unit prices.
            Price::PerUnit { per_unit, .. } => PriceBilling::PerUnit { amount: *per_unit },
            Price::Tiered { tiers, mode } => PriceBilling::Tiered {
                tiers: translate_tiers(tiers),
                mode: *mode,
            },
        };

        let spec = PriceSpec {
            product_id: product_id.to_string(),
            billing,
            cadence,
            trial_days,
        };
        let id = self.gateway.create_price(&spec).await?;
        tracing::info!(plan = %plan.id, interval = %interval, price = %id, "created price");
        result.prices_created += 1;

        Ok(())
    }

    async fn sync_addon(
        &self,
        addon: &Addon,
        products: &[RemoteProduct],
        result: &mut SyncResult,
    ) -> EngineResult<()> {
        // Addons are products with a single one-time price
        let amount = addon.price.amount();

        let product_id = match match_product(products, &addon.id, &addon.name) {
            Some(product) => {
                if product
                    .prices
                    .iter()
                    .any(|p| p.interval.is_empty() && p.active && p.amount == amount)
                {
                    return Ok(());
                }
                product.id.clone()
            }
            None => {
                let spec = ProductSpec {
                    name: addon.name.clone(),
                    description: None,
                    metadata: [
                        ("addon_code".to_string(), addon.id.clone()),
                        ("type".to_string(), "addon".to_string()),
                    ]
                    .into_iter()
                    .collect(),
                    features: Vec::new(),
                };
                let id = self.gateway.create_product(&spec).await?;
                tracing::info!(addon = %addon.id, product = %id, "created addon product");
                result.addons_created += 1;
                id
            }
        };

        let spec = PriceSpec {
            product_id,
            billing: PriceBilling::Flat { amount },
            cadence: Cadence::OneTime,
            trial_days: None,
        };
        self.gateway.create_price(&spec).await?;
        result.prices_created += 1;

        Ok(())
    }

    async fn sync_promotion(
        &self,
        promo: &Promotion,
        result: &mut SyncResult,
    ) -> EngineResult<()> {
        if !promo.is_active() {
            return Ok(());
        }

        let mut spec = CouponSpec {
            id: promo.code.clone(),
            percent_off: None,
            amount_off: None,
            duration: match promo.duration {
                PromoDuration::Once => CouponTerm::Once,
                PromoDuration::Forever => CouponTerm::Forever,
                PromoDuration::Months(months) => CouponTerm::Repeating(months),
            },
            max_redemptions: (promo.max_uses > 0).then(|| promo.max_uses as i64),
        };
        if promo.discount.percent > 0 {
            spec.percent_off = Some(f64::from(promo.discount.percent));
        } else if promo.discount.fixed > 0 {
            spec.amount_off = Some(promo.discount.fixed);
        }

        match self.gateway.create_coupon(&spec).await? {
            CreateOutcome::Created(_) => result.coupons_created += 1,
            CreateOutcome::AlreadyExists => {
                let warning = format!("coupon '{}' already exists, skipping", promo.code);
                tracing::warn!(code = %promo.code, "coupon already exists");
                result.warnings.push(warning);
                return Ok(());
            }
        }

        // The customer-facing code, referencing the coupon just created
        match self
            .gateway
            .create_promotion_code(&promo.code, &promo.code, promo.new_customers_only)
            .await?
        {
            CreateOutcome::Created(_) => result.promos_created += 1,
            CreateOutcome::AlreadyExists => {
                let warning = format!("promotion code '{}' already exists, skipping", promo.code);
                tracing::warn!(code = %promo.code, "promotion code already exists");
                result.warnings.push(warning);
            }
        }

        Ok(())
    }
}

fn product_spec_for_plan(plan: &Plan) -> ProductSpec {
    let mut metadata = plan.string_metadata();
    metadata.insert("plan_code".to_string(), plan.id.clone());
    if let Some(headline) = &plan.headline {
        metadata.insert("headline".to_string(), headline.clone());
    }
    if let Some(plan_type) = &plan.plan_type {
        metadata.insert("plan_type".to_string(), plan_type.clone());
    }
    if let Some(billing_model) = &plan.billing_model {
        metadata.insert("billing_model".to_string(), billing_model.clone());
    }
    ProductSpec {
        name: plan.name.clone(),
        description: plan.description.clone(),
        metadata,
        features: plan.features.clone(),
    }
}

/// Translate catalog tiers 1:1. A tier with a non-zero flat fee sets only
/// the flat amount; otherwise the per-unit amount is set even when zero,
/// since zero is a valid free tier distinct from absent.
fn translate_tiers(tiers: &[Tier]) -> Vec<TierSpec> {
    tiers
        .iter()
        .map(|tier| {
            let up_to = match tier.up_to {
                TierBound::Limit(n) => Some(n),
                TierBound::Unlimited => None,
            };
            if tier.flat > 0 {
                TierSpec {
                    up_to,
                    unit_amount: None,
                    flat_amount: Some(tier.flat),
                }
            } else {
                TierSpec {
                    up_to,
                    unit_amount: Some(tier.amount),
                    flat_amount: None,
                }
            }
        })
        .collect()
}
