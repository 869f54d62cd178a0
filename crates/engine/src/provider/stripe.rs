//! Stripe implementation of the provider gateway
//!
//! Owns the `async-stripe` client and every wire-level concern: credential
//! validation, sequential pagination, request construction, and mapping the
//! "resource already exists" conflict to a non-fatal outcome. The client is
//! constructed once per invocation carrying its credential and environment;
//! no process-wide state is touched.

use async_trait::async_trait;
use pricebook_catalog::model::TierMode;
use stripe::{
    Client, Coupon, CouponDuration, CouponId, CreateCoupon, CreatePrice, CreatePriceRecurring,
    CreatePriceRecurringInterval, CreatePriceRecurringUsageType, CreatePriceTiers, CreateProduct,
    CreateProductFeatures, CreatePromotionCode, CreatePromotionCodeRestrictions, Currency,
    ErrorCode, IdOrCreate, ListCoupons, ListPrices, ListProducts, PriceBillingScheme, PriceId,
    PriceTiersMode, ProductId, RecurringInterval, StripeError, UpTo, UpToOther,
    UpdatePrice,
    UpdateProduct,
};

use crate::error::{EngineError, EngineResult};
use crate::provider::{
    Cadence, CouponSpec, CouponTerm, CreateOutcome, Environment, PriceBilling, PriceSpec,
    ProductSpec, ProviderGateway,
};
use crate::snapshot::{RemoteCoupon, RemotePrice, RemoteProduct};

const PAGE_SIZE: u64 = 100;

/// Stripe gateway bound to one credential and environment
pub struct StripeGateway {
    client: Client,
    env: Environment,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    /// Create a gateway after checking that the key prefix matches the
    /// declared environment.
    pub fn new(env: Environment, api_key: &str) -> EngineResult<Self> {
        validate_key(env, api_key)?;
        Ok(Self {
            client: Client::new(api_key),
            env,
        })
    }
}

fn validate_key(env: Environment, api_key: &str) -> EngineResult<()> {
    if api_key.is_empty() {
        return Err(EngineError::Config("API key is empty".to_string()));
    }
    match env {
        Environment::Sandbox if !api_key.starts_with("sk_test_") => Err(EngineError::Config(
            format!(
                "sandbox environment requires a test key (sk_test_...), got key with prefix '{}'",
                key_prefix(api_key)
            ),
        )),
        Environment::Production if !api_key.starts_with("sk_live_") => Err(EngineError::Config(
            format!(
                "production environment requires a live key (sk_live_...), got key with prefix '{}'",
                key_prefix(api_key)
            ),
        )),
        _ => Ok(()),
    }
}

fn key_prefix(key: &str) -> String {
    let cut = key.len().min(8);
    format!("{}...", &key[..cut])
}

#[async_trait]
impl ProviderGateway for StripeGateway {
    fn environment(&self) -> Environment {
        self.env
    }

    async fn list_products(&self, active_only: bool) -> EngineResult<Vec<RemoteProduct>> {
        let mut params = ListProducts::new();
        params.active = active_only.then_some(true);
        params.limit = Some(PAGE_SIZE);

        let mut products = Vec::new();
        loop {
            let page = stripe::Product::list(&self.client, &params).await?;
            let has_more = page.has_more;
            let last_id: Option<ProductId> = page.data.last().map(|p| p.id.clone());
            products.extend(page.data.into_iter().map(remote_product));
            if !has_more {
                break;
            }
            params.starting_after = last_id;
        }
        Ok(products)
    }

    async fn list_prices(
        &self,
        product_id: Option<&str>,
        active_only: bool,
    ) -> EngineResult<Vec<RemotePrice>> {
        let mut params = ListPrices::new();
        params.product = product_id.map(IdOrCreate::Id);
        params.active = active_only.then_some(true);
        params.limit = Some(PAGE_SIZE);

        let mut prices = Vec::new();
        loop {
            let page = stripe::Price::list(&self.client, &params).await?;
            let has_more = page.has_more;
            let last_id: Option<PriceId> = page.data.last().map(|p| p.id.clone());
            prices.extend(page.data.into_iter().map(remote_price));
            if !has_more {
                break;
            }
            params.starting_after = last_id;
        }
        Ok(prices)
    }

    async fn create_product(&self, spec: &ProductSpec) -> EngineResult<String> {
        let mut params = CreateProduct::new(&spec.name);
        if let Some(description) = spec.description.as_deref() {
            params.description = Some(description);
        }
        params.metadata = Some(
            spec.metadata
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        if !spec.features.is_empty() {
            params.features = Some(
                spec.features
                    .iter()
                    .map(|name| CreateProductFeatures { name: name.clone() })
                    .collect(),
            );
        }

        let product = stripe::Product::create(&self.client, params).await?;
        Ok(product.id.to_string())
    }

    async fn create_price(&self, spec: &PriceSpec) -> EngineResult<String> {
        let mut params = CreatePrice::new(Currency::USD);
        params.product = Some(IdOrCreate::Id(&spec.product_id));

        // Licensed usage: quantity is supplied at subscription time
        let usage_type = matches!(spec.billing, PriceBilling::PerUnit { .. })
            .then_some(CreatePriceRecurringUsageType::Licensed);

        match &spec.billing {
            PriceBilling::Flat { amount } | PriceBilling::PerUnit { amount } => {
                params.unit_amount = Some(*amount);
            }
            PriceBilling::Tiered { tiers, mode } => {
                params.billing_scheme = Some(PriceBillingScheme::Tiered);
                params.tiers_mode = Some(match mode {
                    TierMode::Graduated => PriceTiersMode::Graduated,
                    TierMode::Volume => PriceTiersMode::Volume,
                });
                params.tiers = Some(
                    tiers
                        .iter()
                        .map(|tier| CreatePriceTiers {
                            flat_amount: tier.flat_amount,
                            flat_amount_decimal: None,
                            unit_amount: tier.unit_amount,
                            unit_amount_decimal: None,
                            up_to: Some(match tier.up_to {
                                Some(n) => UpTo::Max(n),
                                None => UpTo::Other(UpToOther::Inf),
                            }),
                        })
                        .collect(),
                );
            }
        }

        if let Some((interval, interval_count)) = recurrence(spec.cadence) {
            params.recurring = Some(CreatePriceRecurring {
                interval,
                interval_count,
                trial_period_days: spec.trial_days,
                aggregate_usage: None,
                usage_type,
            });
        }

        let price = stripe::Price::create(&self.client, params).await?;
        Ok(price.id.to_string())
    }

    async fn deactivate_price(&self, price_id: &str) -> EngineResult<()> {
        let id = parse_id::<PriceId>(price_id)?;
        stripe::Price::update(
            &self.client,
            &id,
            UpdatePrice {
                active: Some(false),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    async fn deactivate_product(&self, product_id: &str) -> EngineResult<()> {
        let id = parse_id::<ProductId>(product_id)?;
        stripe::Product::update(
            &self.client,
            &id,
            UpdateProduct {
                active: Some(false),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    async fn create_coupon(&self, spec: &CouponSpec) -> EngineResult<CreateOutcome> {
        let mut params = CreateCoupon::new();
        params.id = Some(&spec.id);
        params.percent_off = spec.percent_off;
        if let Some(amount) = spec.amount_off {
            params.amount_off = Some(amount);
            params.currency = Some(Currency::USD);
        }
        match spec.duration {
            CouponTerm::Once => params.duration = Some(CouponDuration::Once),
            CouponTerm::Forever => params.duration = Some(CouponDuration::Forever),
            CouponTerm::Repeating(months) => {
                params.duration = Some(CouponDuration::Repeating);
                params.duration_in_months = Some(i64::from(months));
            }
        }
        params.max_redemptions = spec.max_redemptions;

        match Coupon::create(&self.client, params).await {
            Ok(coupon) => Ok(CreateOutcome::Created(coupon.id.to_string())),
            Err(err) if is_already_exists(&err) => Ok(CreateOutcome::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn create_promotion_code(
        &self,
        coupon_id: &str,
        code: &str,
        first_time_only: bool,
    ) -> EngineResult<CreateOutcome> {
        let coupon = parse_id::<CouponId>(coupon_id)?;
        let mut params = CreatePromotionCode::new(&coupon);
        params.code = Some(code);
        if first_time_only {
            params.restrictions = Some(CreatePromotionCodeRestrictions {
                first_time_transaction: Some(true),
                ..Default::default()
            });
        }

        match params.send(&self.client).await {
            Ok(promo) => Ok(CreateOutcome::Created(promo.id.to_string())),
            Err(err) if is_already_exists(&err) => Ok(CreateOutcome::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn list_coupons(&self) -> EngineResult<Vec<RemoteCoupon>> {
        let mut params = ListCoupons::new();
        params.limit = Some(PAGE_SIZE);

        let mut coupons = Vec::new();
        loop {
            let page = Coupon::list(&self.client, &params).await?;
            let has_more = page.has_more;
            let last_id: Option<CouponId> = page.data.last().map(|c| c.id.clone());
            coupons.extend(page.data.into_iter().map(|c| RemoteCoupon {
                id: c.id.to_string(),
            }));
            if !has_more {
                break;
            }
            params.starting_after = last_id;
        }
        Ok(coupons)
    }

    async fn delete_coupon(&self, coupon_id: &str) -> EngineResult<()> {
        let id = parse_id::<CouponId>(coupon_id)?;
        Coupon::delete(&self.client, &id).await?;
        Ok(())
    }
}

fn recurrence(cadence: Cadence) -> Option<(CreatePriceRecurringInterval, Option<u64>)> {
    match cadence {
        Cadence::Monthly => Some((CreatePriceRecurringInterval::Month, None)),
        Cadence::Quarterly => Some((CreatePriceRecurringInterval::Month, Some(3))),
        Cadence::Yearly => Some((CreatePriceRecurringInterval::Year, None)),
        Cadence::OneTime => None,
    }
}

fn remote_product(product: stripe::Product) -> RemoteProduct {
    let metadata = product.metadata.unwrap_or_default();
    RemoteProduct {
        id: product.id.to_string(),
        name: product.name.unwrap_or_default(),
        plan_code: metadata.get("plan_code").cloned(),
        billing_model: metadata.get("billing_model").cloned(),
        active: product.active.unwrap_or(false),
        prices: Vec::new(),
    }
}

fn remote_price(price: stripe::Price) -> RemotePrice {
    let interval = match &price.recurring {
        None => String::new(),
        Some(recurring) => match (recurring.interval, recurring.interval_count) {
            (RecurringInterval::Month, 3) => "quarterly".to_string(),
            (RecurringInterval::Month, _) => "monthly".to_string(),
            (RecurringInterval::Year, _) => "yearly".to_string(),
            (other, _) => other.to_string(),
        },
    };
    RemotePrice {
        id: price.id.to_string(),
        interval,
        amount: price.unit_amount.unwrap_or(0),
        currency: price
            .currency
            .map(|c| c.to_string())
            .unwrap_or_default(),
        active: price.active.unwrap_or(false),
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str) -> EngineResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|err| EngineError::Api(format!("invalid id '{raw}': {err}")))
}

fn is_already_exists(err: &StripeError) -> bool {
    matches!(
        err,
        StripeError::Stripe(request) if request.code == Some(ErrorCode::ResourceAlreadyExists)
    )
}
