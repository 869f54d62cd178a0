//! Billing catalog data model
//!
//! The catalog is the local, version-controlled description of everything a
//! billing account should contain: plans with their prices, the entitlement
//! dimensions those plans reference, purchasable addons, and promotion codes.
//!
//! Price shape is inferred from field presence rather than declared: a price
//! with `tiers` is tiered, else a price with a positive `per_unit` is
//! per-unit, else it is flat. [`Price`] makes that inference explicit as a
//! tagged enum so downstream code matches on shape instead of probing
//! optional fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Catalog file format version this build understands
pub const SCHEMA_VERSION: u32 = 1;

/// The one provider implementation that exists today
pub const PROVIDER_STRIPE: &str = "stripe";

/// The full billing catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entitlements: BTreeMap<String, Entitlement>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<Addon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promotions: Vec<Promotion>,
}

/// A feature or limit dimension that plans and addons can reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    #[serde(rename = "type")]
    pub kind: EntitlementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementKind {
    Int,
    Bool,
    Rate,
}

/// A pricing plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_model: Option<String>,
    /// Per-plan provider override; falls back to the catalog-level list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub trial_days: u32,
    #[serde(default)]
    pub prices: BTreeMap<String, Price>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, LimitValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrades_to: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Plan {
    /// Whether this plan targets the given provider, honoring the per-plan
    /// override before the catalog-level list.
    pub fn targets_provider(&self, provider: &str, global: &[String]) -> bool {
        let list = self.providers.as_deref().unwrap_or(global);
        list.iter().any(|p| p == provider)
    }

    /// Custom metadata entries whose values are strings. Non-string values
    /// are kept in the catalog but never forwarded to a provider.
    pub fn string_metadata(&self) -> BTreeMap<String, String> {
        self.metadata
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }
}

/// A price point, shape inferred from field presence (tiers, then per_unit,
/// then flat)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPrice", into = "RawPrice")]
pub enum Price {
    Flat {
        amount: i64,
    },
    PerUnit {
        per_unit: i64,
        unit: Option<String>,
        min_units: Option<u64>,
        max_units: Option<u64>,
    },
    Tiered {
        tiers: Vec<Tier>,
        mode: TierMode,
    },
}

impl Price {
    /// The scalar amount used for flat-price comparison: the flat amount,
    /// the per-unit amount, or the first tier's per-unit amount.
    pub fn amount(&self) -> i64 {
        match self {
            Price::Flat { amount } => *amount,
            Price::PerUnit { per_unit, .. } => *per_unit,
            Price::Tiered { tiers, .. } => tiers.first().map(|t| t.amount).unwrap_or(0),
        }
    }
}

/// Wire representation of a price: a bag of optional fields the shape is
/// inferred from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RawPrice {
    #[serde(skip_serializing_if = "is_zero_i64")]
    amount: i64,
    #[serde(skip_serializing_if = "is_zero_i64")]
    per_unit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_units: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_units: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tiers: Option<Vec<Tier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<TierMode>,
}

impl From<RawPrice> for Price {
    fn from(raw: RawPrice) -> Self {
        if let Some(tiers) = raw.tiers {
            return Price::Tiered {
                tiers,
                mode: raw.mode.unwrap_or_default(),
            };
        }
        if raw.per_unit > 0 {
            return Price::PerUnit {
                per_unit: raw.per_unit,
                unit: raw.unit,
                min_units: raw.min_units,
                max_units: raw.max_units,
            };
        }
        Price::Flat { amount: raw.amount }
    }
}

impl From<Price> for RawPrice {
    fn from(price: Price) -> Self {
        match price {
            Price::Flat { amount } => RawPrice {
                amount,
                ..RawPrice::default()
            },
            Price::PerUnit {
                per_unit,
                unit,
                min_units,
                max_units,
            } => RawPrice {
                per_unit,
                unit,
                min_units,
                max_units,
                ..RawPrice::default()
            },
            Price::Tiered { tiers, mode } => RawPrice {
                tiers: Some(tiers),
                mode: Some(mode),
                ..RawPrice::default()
            },
        }
    }
}

/// One tier of a tiered price. A tier with a non-zero `flat` component is a
/// flat-fee tier; otherwise `amount` is the per-unit amount (zero is a valid
/// free tier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub up_to: TierBound,
    #[serde(default)]
    pub amount: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub flat: i64,
}

/// Upper bound of a tier: a unit count, or `"unlimited"` for the open-ended
/// final tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBound", into = "RawBound")]
pub enum TierBound {
    Limit(u64),
    Unlimited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBound {
    Limit(u64),
    Word(String),
}

impl TryFrom<RawBound> for TierBound {
    type Error = String;

    fn try_from(raw: RawBound) -> Result<Self, Self::Error> {
        match raw {
            RawBound::Limit(n) => Ok(TierBound::Limit(n)),
            RawBound::Word(w) if w == "unlimited" => Ok(TierBound::Unlimited),
            RawBound::Word(w) => Err(format!(
                "invalid tier bound '{w}' (expected a number or \"unlimited\")"
            )),
        }
    }
}

impl From<TierBound> for RawBound {
    fn from(bound: TierBound) -> Self {
        match bound {
            TierBound::Limit(n) => RawBound::Limit(n),
            TierBound::Unlimited => RawBound::Word("unlimited".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierMode {
    #[default]
    Graduated,
    Volume,
}

/// Value of a plan limit or addon grant. The semantic validator only needs
/// key presence; values stay a small closed variant instead of free-form
/// dynamic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLimit", into = "RawLimit")]
pub enum LimitValue {
    Bool(bool),
    Int(i64),
    Unlimited,
    Rate { limit: i64, per: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Bool(bool),
    Int(i64),
    Word(String),
    Rate { limit: i64, per: String },
}

impl TryFrom<RawLimit> for LimitValue {
    type Error = String;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Bool(b) => Ok(LimitValue::Bool(b)),
            RawLimit::Int(n) => Ok(LimitValue::Int(n)),
            RawLimit::Word(w) if w == "unlimited" => Ok(LimitValue::Unlimited),
            RawLimit::Word(w) => Err(format!(
                "invalid limit value '{w}' (expected a number, a boolean, \"unlimited\", or a rate object)"
            )),
            RawLimit::Rate { limit, per } => Ok(LimitValue::Rate { limit, per }),
        }
    }
}

impl From<LimitValue> for RawLimit {
    fn from(value: LimitValue) -> Self {
        match value {
            LimitValue::Bool(b) => RawLimit::Bool(b),
            LimitValue::Int(n) => RawLimit::Int(n),
            LimitValue::Unlimited => RawLimit::Word("unlimited".to_string()),
            LimitValue::Rate { limit, per } => RawLimit::Rate { limit, per },
        }
    }
}

/// A purchasable addon: a product with a single price and the entitlements
/// it grants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub grants: BTreeMap<String, LimitValue>,
}

/// A promotional discount code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount: Discount,
    #[serde(default)]
    pub duration: PromoDuration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applies_to: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub new_customers_only: bool,
    /// Maximum redemptions; zero means uncapped
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub max_uses: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Promotion {
    /// Promotions default to active when the flag is absent
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Discount {
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub percent: u32,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub fixed: i64,
}

/// How long a promotion's discount applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "RawDuration")]
pub enum PromoDuration {
    #[default]
    Once,
    Forever,
    Months(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Word(String),
    Repeating { months: u32 },
}

impl TryFrom<RawDuration> for PromoDuration {
    type Error = String;

    fn try_from(raw: RawDuration) -> Result<Self, Self::Error> {
        match raw {
            RawDuration::Word(w) if w == "once" => Ok(PromoDuration::Once),
            RawDuration::Word(w) if w == "forever" => Ok(PromoDuration::Forever),
            RawDuration::Word(w) => Err(format!(
                "invalid duration '{w}' (expected \"once\", \"forever\", or {{months: N}})"
            )),
            RawDuration::Repeating { months } => Ok(PromoDuration::Months(months)),
        }
    }
}

impl From<PromoDuration> for RawDuration {
    fn from(duration: PromoDuration) -> Self {
        match duration {
            PromoDuration::Once => RawDuration::Word("once".to_string()),
            PromoDuration::Forever => RawDuration::Word("forever".to_string()),
            PromoDuration::Months(months) => RawDuration::Repeating { months },
        }
    }
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}
