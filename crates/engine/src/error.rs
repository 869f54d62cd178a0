//! Engine error types

use thiserror::Error;

use crate::provider::Environment;

/// Errors raised by the reconciliation engine and its provider gateway
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("duplicate plan code '{code}' on active products {first} and {second}")]
    DuplicatePlanCode {
        code: String,
        first: String,
        second: String,
    },

    #[error("Stripe API error: {0}")]
    Api(String),

    #[error("truncate is only allowed in sandbox environment (got {0})")]
    TruncateForbidden(Environment),
}

impl From<stripe::StripeError> for EngineError {
    fn from(err: stripe::StripeError) -> Self {
        EngineError::Api(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
