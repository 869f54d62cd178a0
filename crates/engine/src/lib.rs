//! Pricebook reconciliation engine
//!
//! Matches local catalog entities to remote provider state, computes
//! structured diffs, and performs idempotent create/archive mutations. The
//! provider is consumed through the narrow [`provider::ProviderGateway`]
//! contract; [`provider::StripeGateway`] is the one real implementation.

pub mod differ;
pub mod error;
pub mod import;
pub mod matcher;
pub mod provider;
pub mod reconciler;
pub mod report;
pub mod snapshot;
pub mod truncate;

pub use differ::{compare, DiffResult, DiffStatus};
pub use error::{EngineError, EngineResult};
pub use import::{import, ImportOutcome};
pub use provider::{Environment, ProviderGateway, StripeGateway};
pub use reconciler::{Reconciler, SyncError, SyncResult};
pub use snapshot::{fetch_snapshot, RemoteProduct};
pub use truncate::{truncate, TruncateError, TruncateResult};
