//! In-memory provider gateway for tests
//!
//! Mutates an in-memory account and records every call, so idempotence,
//! conflict replacement, operation ordering, and the truncate safety rail
//! are all observable without the network.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{EngineError, EngineResult};
use crate::provider::{
    CouponSpec, CreateOutcome, Environment, PriceBilling, PriceSpec, ProductSpec, ProviderGateway,
};
use crate::snapshot::{RemoteCoupon, RemotePrice, RemoteProduct};

pub struct MockGateway {
    env: Environment,
    pub products: Mutex<Vec<RemoteProduct>>,
    pub coupons: Mutex<Vec<RemoteCoupon>>,
    pub promo_codes: Mutex<Vec<String>>,
    /// Every create_price request, verbatim
    pub price_specs: Mutex<Vec<PriceSpec>>,
    /// Every create_coupon request, verbatim
    pub coupon_specs: Mutex<Vec<CouponSpec>>,
    /// One entry per gateway call, in order
    pub calls: Mutex<Vec<String>>,
    counter: AtomicU32,
}

impl MockGateway {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            products: Mutex::new(Vec::new()),
            coupons: Mutex::new(Vec::new()),
            promo_codes: Mutex::new(Vec::new()),
            price_specs: Mutex::new(Vec::new()),
            coupon_specs: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            counter: AtomicU32::new(0),
        }
    }

    pub fn seed_product(
        &self,
        id: &str,
        name: &str,
        plan_code: Option<&str>,
        prices: Vec<(&str, i64, bool)>,
    ) {
        let prices = prices
            .into_iter()
            .enumerate()
            .map(|(i, (interval, amount, active))| RemotePrice {
                id: format!("{id}_price_{i}"),
                interval: interval.to_string(),
                amount,
                currency: "usd".to_string(),
                active,
            })
            .collect();
        self.products.lock().unwrap().push(RemoteProduct {
            id: id.to_string(),
            name: name.to_string(),
            plan_code: plan_code.map(str::to_string),
            billing_model: None,
            active: true,
            prices,
        });
    }

    pub fn seed_coupon(&self, id: &str) {
        self.coupons.lock().unwrap().push(RemoteCoupon {
            id: id.to_string(),
        });
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_mock_{n}")
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ProviderGateway for MockGateway {
    fn environment(&self) -> Environment {
        self.env
    }

    async fn list_products(&self, active_only: bool) -> EngineResult<Vec<RemoteProduct>> {
        self.record("list_products");
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }

    async fn list_prices(
        &self,
        product_id: Option<&str>,
        active_only: bool,
    ) -> EngineResult<Vec<RemotePrice>> {
        self.record("list_prices");
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| product_id.map(|id| p.id == id).unwrap_or(true))
            .flat_map(|p| p.prices.iter())
            .filter(|price| !active_only || price.active)
            .cloned()
            .collect())
    }

    async fn create_product(&self, spec: &ProductSpec) -> EngineResult<String> {
        let id = self.next_id("prod");
        self.record(format!("create_product:{id}"));
        self.products.lock().unwrap().push(RemoteProduct {
            id: id.clone(),
            name: spec.name.clone(),
            plan_code: spec.metadata.get("plan_code").cloned(),
            billing_model: spec.metadata.get("billing_model").cloned(),
            active: true,
            prices: Vec::new(),
        });
        Ok(id)
    }

    async fn create_price(&self, spec: &PriceSpec) -> EngineResult<String> {
        let id = self.next_id("price");
        self.record(format!("create_price:{id}"));
        let amount = match &spec.billing {
            PriceBilling::Flat { amount } | PriceBilling::PerUnit { amount } => *amount,
            PriceBilling::Tiered { tiers, .. } => tiers
                .first()
                .and_then(|t| t.unit_amount.or(t.flat_amount))
                .unwrap_or(0),
        };
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == spec.product_id)
            .ok_or_else(|| EngineError::Api(format!("no such product: {}", spec.product_id)))?;
        product.prices.push(RemotePrice {
            id: id.clone(),
            interval: spec.cadence.interval_label().to_string(),
            amount,
            currency: "usd".to_string(),
            active: true,
        });
        self.price_specs.lock().unwrap().push(spec.clone());
        Ok(id)
    }

    async fn deactivate_price(&self, price_id: &str) -> EngineResult<()> {
        self.record(format!("deactivate_price:{price_id}"));
        for product in self.products.lock().unwrap().iter_mut() {
            for price in product.prices.iter_mut() {
                if price.id == price_id {
                    price.active = false;
                    return Ok(());
                }
            }
        }
        Err(EngineError::Api(format!("no such price: {price_id}")))
    }

    async fn deactivate_product(&self, product_id: &str) -> EngineResult<()> {
        self.record(format!("deactivate_product:{product_id}"));
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| EngineError::Api(format!("no such product: {product_id}")))?;
        product.active = false;
        Ok(())
    }

    async fn create_coupon(&self, spec: &CouponSpec) -> EngineResult<CreateOutcome> {
        self.record(format!("create_coupon:{}", spec.id));
        let mut coupons = self.coupons.lock().unwrap();
        if coupons.iter().any(|c| c.id == spec.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        coupons.push(RemoteCoupon { id: spec.id.clone() });
        self.coupon_specs.lock().unwrap().push(spec.clone());
        Ok(CreateOutcome::Created(spec.id.clone()))
    }

    async fn create_promotion_code(
        &self,
        _coupon_id: &str,
        code: &str,
        _first_time_only: bool,
    ) -> EngineResult<CreateOutcome> {
        self.record(format!("create_promotion_code:{code}"));
        let mut codes = self.promo_codes.lock().unwrap();
        if codes.iter().any(|c| c == code) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        codes.push(code.to_string());
        Ok(CreateOutcome::Created(code.to_string()))
    }

    async fn list_coupons(&self) -> EngineResult<Vec<RemoteCoupon>> {
        self.record("list_coupons");
        Ok(self.coupons.lock().unwrap().clone())
    }

    async fn delete_coupon(&self, coupon_id: &str) -> EngineResult<()> {
        self.record(format!("delete_coupon:{coupon_id}"));
        self.coupons.lock().unwrap().retain(|c| c.id != coupon_id);
        Ok(())
    }
}
