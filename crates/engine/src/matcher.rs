//! Local-to-remote identity resolution
//!
//! A plan or addon is matched to a remote product in two tiers: an exact
//! `plan_code` metadata match first, then a normalized-name fallback that
//! compares the remote display name against the local id. The fallback is
//! deliberately asymmetric — it lets a hand-created product named
//! "Pro Plan" match local id `pro` without any metadata tagging — at the
//! cost of being a heuristic that can mismatch on contrived names.
//!
//! Archived products are never considered.

use crate::snapshot::RemoteProduct;

/// Resolve a local id to an active remote product, code match first, then
/// normalized-name fallback. The local display name takes no part in
/// matching; it is carried for the contract only.
pub fn match_product<'a>(
    products: &'a [RemoteProduct],
    local_id: &str,
    _local_name: &str,
) -> Option<&'a RemoteProduct> {
    // Primary: plan_code metadata (active only)
    if let Some(found) = products
        .iter()
        .find(|p| p.active && p.plan_code.as_deref() == Some(local_id))
    {
        return Some(found);
    }

    // Fallback: normalized remote name against normalized local id
    let normalized_id = normalize_name(local_id);
    products
        .iter()
        .find(|p| p.active && normalize_name(&p.name) == normalized_id)
}

/// Lowercase, fold spaces and hyphens to underscores, strip a trailing
/// `_plan` suffix.
pub fn normalize_name(name: &str) -> String {
    let name = name.to_lowercase().replace([' ', '-'], "_");
    name.strip_suffix("_plan")
        .map(str::to_string)
        .unwrap_or(name)
}
