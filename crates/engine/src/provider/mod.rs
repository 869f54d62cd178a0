//! Provider gateway
//!
//! The engine consumes a narrow, provider-neutral contract: list, create,
//! and archive resources. [`StripeGateway`](stripe::StripeGateway) is the
//! one real implementation; tests drive the engine through an in-memory
//! mock. The design anticipates other providers only through this trait.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use pricebook_catalog::model::TierMode;

use crate::error::{EngineError, EngineResult};
use crate::snapshot::{RemoteCoupon, RemotePrice, RemoteProduct};

pub mod stripe;

#[cfg(test)]
pub(crate) mod mock;

pub use self::stripe::StripeGateway;

/// The two provider environments a credential can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(EngineError::Config(format!(
                "invalid environment: {other} (use 'sandbox' or 'production')"
            ))),
        }
    }
}

/// Billing cadence of a price, translated from a catalog interval name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Monthly,
    Quarterly,
    Yearly,
    OneTime,
}

impl Cadence {
    /// Strict interval translation; anything unknown is a hard error.
    pub fn from_interval(interval: &str) -> EngineResult<Self> {
        match interval {
            "monthly" => Ok(Cadence::Monthly),
            "quarterly" => Ok(Cadence::Quarterly),
            "yearly" => Ok(Cadence::Yearly),
            "one_time" => Ok(Cadence::OneTime),
            other => Err(EngineError::UnsupportedInterval(other.to_string())),
        }
    }

    /// The interval label used in remote snapshots; one-time prices have
    /// an empty label.
    pub fn interval_label(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::Yearly => "yearly",
            Cadence::OneTime => "",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Cadence::OneTime)
    }
}

/// Request to create a product
#[derive(Debug, Clone)]
pub struct ProductSpec {
    pub name: String,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
    /// Marketing feature bullets
    pub features: Vec<String>,
}

/// Request to create a price
#[derive(Debug, Clone)]
pub struct PriceSpec {
    pub product_id: String,
    pub billing: PriceBilling,
    pub cadence: Cadence,
    /// Trial days attached to recurring prices only
    pub trial_days: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum PriceBilling {
    Flat { amount: i64 },
    /// Licensed per-unit billing; quantity is supplied at subscription time
    PerUnit { amount: i64 },
    Tiered { tiers: Vec<TierSpec>, mode: TierMode },
}

/// One provider-side tier. Exactly one of `unit_amount`/`flat_amount` is
/// set; `up_to: None` is the open-ended final tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSpec {
    pub up_to: Option<u64>,
    pub unit_amount: Option<i64>,
    pub flat_amount: Option<i64>,
}

/// Request to create a discount coupon
#[derive(Debug, Clone)]
pub struct CouponSpec {
    /// Coupon ID; the promotion code doubles as the identifier
    pub id: String,
    pub percent_off: Option<f64>,
    pub amount_off: Option<i64>,
    pub duration: CouponTerm,
    pub max_redemptions: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponTerm {
    Once,
    Forever,
    Repeating(u32),
}

/// Result of a create call that can hit an "already exists" conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(String),
    AlreadyExists,
}

/// The narrow provider contract the engine is written against.
///
/// All calls block the invocation until complete; pagination is consumed to
/// exhaustion inside the gateway. Retries, if any, belong to the underlying
/// provider client.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// The environment this gateway's credential is bound to
    fn environment(&self) -> Environment;

    async fn list_products(&self, active_only: bool) -> EngineResult<Vec<RemoteProduct>>;

    /// List prices, optionally scoped to one product, optionally active-only
    async fn list_prices(
        &self,
        product_id: Option<&str>,
        active_only: bool,
    ) -> EngineResult<Vec<RemotePrice>>;

    async fn create_product(&self, spec: &ProductSpec) -> EngineResult<String>;

    async fn create_price(&self, spec: &PriceSpec) -> EngineResult<String>;

    /// Archive a price (soft deactivation; prices are never hard-deleted)
    async fn deactivate_price(&self, price_id: &str) -> EngineResult<()>;

    /// Archive a product (soft deactivation)
    async fn deactivate_product(&self, product_id: &str) -> EngineResult<()>;

    async fn create_coupon(&self, spec: &CouponSpec) -> EngineResult<CreateOutcome>;

    async fn create_promotion_code(
        &self,
        coupon_id: &str,
        code: &str,
        first_time_only: bool,
    ) -> EngineResult<CreateOutcome>;

    async fn list_coupons(&self) -> EngineResult<Vec<RemoteCoupon>>;

    /// Coupons support hard delete, unlike products and prices
    async fn delete_coupon(&self, coupon_id: &str) -> EngineResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_translation() {
        assert_eq!(Cadence::from_interval("monthly").unwrap(), Cadence::Monthly);
        assert_eq!(
            Cadence::from_interval("quarterly").unwrap(),
            Cadence::Quarterly
        );
        assert_eq!(Cadence::from_interval("yearly").unwrap(), Cadence::Yearly);
        assert_eq!(Cadence::from_interval("one_time").unwrap(), Cadence::OneTime);
        assert!(matches!(
            Cadence::from_interval("weekly"),
            Err(EngineError::UnsupportedInterval(ref s)) if s == "weekly"
        ));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("sandbox".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
