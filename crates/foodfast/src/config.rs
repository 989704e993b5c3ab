//! Runtime settings, read from the environment.

use crate::delivery::{FlightSettings, RecoveryPolicy};
use crate::model::PricingRules;
use crate::order_actor::TransitionPolicy;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub pricing: PricingRules,
    pub transition_policy: TransitionPolicy,
    pub flight: FlightSettings,
    pub delivery_store: PathBuf,
    pub recovery_policy: RecoveryPolicy,
    pub relay_buffer: usize,
    pub http_timeout: Duration,
    pub product_service_url: Option<String>,
    pub order_service_url: Option<String>,
    pub relay_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tick_ms: u64 = try_load(&lookup, "FOODFAST_FLIGHT_TICK_MS", "1500")?;
        let timeout_ms: u64 = try_load(&lookup, "FOODFAST_HTTP_TIMEOUT_MS", "10000")?;

        Ok(Self {
            port: try_load(&lookup, "FOODFAST_PORT", "3000")?,
            pricing: PricingRules {
                free_shipping_threshold: try_load(&lookup, "FOODFAST_FREE_SHIPPING_THRESHOLD", "100000")?,
                shipping_fee: try_load(&lookup, "FOODFAST_SHIPPING_FEE", "30000")?,
            },
            transition_policy: try_load(&lookup, "FOODFAST_TRANSITION_POLICY", "enforced")?,
            flight: FlightSettings {
                step_percent: try_load(&lookup, "FOODFAST_FLIGHT_STEP_PERCENT", "5")?,
                tick: Duration::from_millis(tick_ms),
            },
            delivery_store: try_load(&lookup, "FOODFAST_DELIVERY_STORE", "./data/deliveries")?,
            recovery_policy: try_load(&lookup, "FOODFAST_RECOVERY_POLICY", "resume")?,
            relay_buffer: try_load(&lookup, "FOODFAST_RELAY_BUFFER", "64")?,
            http_timeout: Duration::from_millis(timeout_ms),
            product_service_url: optional(&lookup, "PRODUCT_SERVICE_URL"),
            order_service_url: optional(&lookup, "ORDER_SERVICE_URL"),
            relay_url: optional(&lookup, "RELAY_URL"),
        })
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    let value = lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if value.is_none() {
        info!("{key} not set, using the in-process service");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.pricing, PricingRules::default());
        assert_eq!(config.transition_policy, TransitionPolicy::Enforced);
        assert_eq!(config.flight, FlightSettings::default());
        assert_eq!(config.recovery_policy, RecoveryPolicy::Resume);
        assert_eq!(config.delivery_store, PathBuf::from("./data/deliveries"));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(config.relay_url.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("FOODFAST_PORT", "8080"),
            ("FOODFAST_TRANSITION_POLICY", "permissive"),
            ("FOODFAST_FLIGHT_TICK_MS", "200"),
            ("FOODFAST_RECOVERY_POLICY", "Cancel"),
            ("RELAY_URL", "http://relay:3000 "),
            ("ORDER_SERVICE_URL", ""),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert_eq!(config.flight.tick, Duration::from_millis(200));
        assert_eq!(config.recovery_policy, RecoveryPolicy::Cancel);
        assert_eq!(config.relay_url.as_deref(), Some("http://relay:3000"));
        assert!(config.order_service_url.is_none());
    }

    #[test]
    fn garbage_is_reported_with_its_key() {
        let err = load(&[("FOODFAST_SHIPPING_FEE", "thirty")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "FOODFAST_SHIPPING_FEE", ref value, .. } if value == "thirty"
        ));
    }
}
