//! Command actions

use anyhow::{bail, Context, Result};

use pricebook_catalog::model::PROVIDER_STRIPE;
use pricebook_engine::{Environment, StripeGateway};

pub mod apply;
pub mod config;
pub mod diff;
pub mod import;
pub mod truncate;
pub mod validate;

/// Environment variable carrying the API key for each environment
pub fn api_key_var(env: Environment) -> &'static str {
    match env {
        Environment::Sandbox => "STRIPE_SANDBOX_KEY",
        Environment::Production => "STRIPE_PRODUCTION_KEY",
    }
}

/// Read the API key for the environment from the process environment
pub fn api_key(env: Environment) -> Result<String> {
    let var = api_key_var(env);
    std::env::var(var).with_context(|| format!("environment variable {var} is not set"))
}

/// Build a Stripe gateway for the environment, validating the credential
pub fn gateway(env: Environment) -> Result<StripeGateway> {
    let key = api_key(env)?;
    StripeGateway::new(env, &key).context("failed to create Stripe client")
}

/// Reject catalogs targeting providers this build cannot talk to
pub fn validate_providers(providers: &[String]) -> Result<()> {
    if providers.is_empty() {
        bail!("no providers specified in billing config");
    }
    for provider in providers {
        match provider.as_str() {
            PROVIDER_STRIPE => {}
            "paddle" | "chargebee" => {
                bail!("provider '{provider}' is not supported yet")
            }
            other => bail!("unknown provider: {other}"),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_var_per_environment() {
        assert_eq!(api_key_var(Environment::Sandbox), "STRIPE_SANDBOX_KEY");
        assert_eq!(api_key_var(Environment::Production), "STRIPE_PRODUCTION_KEY");
    }

    #[test]
    fn test_provider_allow_list() {
        assert!(validate_providers(&["stripe".to_string()]).is_ok());
        assert!(validate_providers(&[]).is_err());
        assert!(validate_providers(&["paddle".to_string()]).is_err());
        assert!(validate_providers(&["braintree".to_string()]).is_err());
    }
}
