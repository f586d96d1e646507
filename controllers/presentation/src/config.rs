//! Controller configuration, read from environment variables at startup.

use crate::error::ControllerError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings for the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Deadline for a single reconciliation pass
    pub reconcile_timeout: Duration,
    /// Quiet period after an event before reconciling
    pub debounce: Duration,
    /// Maximum concurrent reconciliations
    pub concurrency: u16,
    /// First retry delay after a failed pass
    pub backoff_min: Duration,
    /// Upper bound for the retry delay
    pub backoff_max: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            reconcile_timeout: Duration::from_secs(30),
            debounce: Duration::from_secs(1),
            concurrency: 4,
            backoff_min: Duration::from_secs(5),
            backoff_max: Duration::from_secs(300),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());
        let reconcile_timeout = Duration::from_secs(parse_var(
            &lookup,
            "RECONCILE_TIMEOUT_SECS",
            defaults.reconcile_timeout.as_secs(),
        )?);
        let debounce = Duration::from_secs(parse_var(
            &lookup,
            "RECONCILE_DEBOUNCE_SECS",
            defaults.debounce.as_secs(),
        )?);
        let concurrency = parse_var(&lookup, "RECONCILE_CONCURRENCY", defaults.concurrency)?;
        let backoff_min = Duration::from_secs(parse_var(
            &lookup,
            "BACKOFF_MIN_SECS",
            defaults.backoff_min.as_secs(),
        )?);
        let backoff_max = Duration::from_secs(parse_var(
            &lookup,
            "BACKOFF_MAX_SECS",
            defaults.backoff_max.as_secs(),
        )?);

        if reconcile_timeout.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_CONCURRENCY must be greater than zero".to_string(),
            ));
        }
        if backoff_min.is_zero() || backoff_min > backoff_max {
            return Err(ControllerError::InvalidConfig(format!(
                "backoff bounds must satisfy 0 < BACKOFF_MIN_SECS ({}) <= BACKOFF_MAX_SECS ({})",
                backoff_min.as_secs(),
                backoff_max.as_secs()
            )));
        }

        Ok(Self {
            namespace,
            reconcile_timeout,
            debounce,
            concurrency,
            backoff_min,
            backoff_max,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            ControllerError::InvalidConfig(format!("{} has invalid value {:?}: {}", name, raw, e))
        }),
    }
}
