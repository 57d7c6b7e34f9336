//! Engine configuration: currency, service fee rate and policy file.

use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::error::{Result, TariffError};
use crate::money::{Currency, Rate};
use crate::policy::FeePolicyTable;

pub const ENV_CURRENCY: &str = "TARIFF_CURRENCY";
pub const ENV_SERVICE_FEE_RATE: &str = "TARIFF_SERVICE_FEE_RATE";
pub const ENV_POLICY_FILE: &str = "TARIFF_POLICY_FILE";

/// Configuration for the fee engine.
#[derive(Debug, Clone)]
pub struct TariffConfig {
    /// Currency every amount is denominated in.
    pub currency: Currency,
    /// Platform service fee charged on top of an order.
    pub service_fee_rate: Rate,
    /// TOML policy file; the seeded table is used when unset.
    pub policy_file: Option<PathBuf>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            service_fee_rate: Rate(Decimal::new(10, 2)),
            policy_file: None,
        }
    }
}

impl TariffConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(code) = lookup(ENV_CURRENCY) {
            config.currency = code.parse()?;
        }
        if let Some(rate) = lookup(ENV_SERVICE_FEE_RATE) {
            config.service_fee_rate = rate.parse()?;
        }
        if let Some(path) = lookup(ENV_POLICY_FILE).filter(|p| !p.trim().is_empty()) {
            config.policy_file = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Build the policy table this configuration points at.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::Config` if the loaded file is denominated in a
    /// different currency than the configuration.
    pub fn policy_table(&self) -> Result<FeePolicyTable> {
        let Some(path) = &self.policy_file else {
            return Ok(FeePolicyTable::seeded(self.currency));
        };
        let table = FeePolicyTable::load(path)?;
        if table.currency() != self.currency {
            return Err(TariffError::Config(format!(
                "{} is denominated in {}, expected {}",
                path.display(),
                table.currency(),
                self.currency
            )));
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TariffConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.currency, Currency::USD);
        assert_eq!(config.service_fee_rate.value(), dec!(0.10));
        assert!(config.policy_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = TariffConfig::from_lookup(lookup(&[
            (ENV_CURRENCY, "eur"),
            (ENV_SERVICE_FEE_RATE, "0.075"),
            (ENV_POLICY_FILE, "/etc/tariff/policies.toml"),
        ]))
        .unwrap();
        assert_eq!(config.currency, Currency::EUR);
        assert_eq!(config.service_fee_rate.value(), dec!(0.075));
        assert_eq!(
            config.policy_file.as_deref(),
            Some(std::path::Path::new("/etc/tariff/policies.toml"))
        );
    }

    #[test]
    fn test_empty_policy_file_is_unset() {
        let config = TariffConfig::from_lookup(lookup(&[(ENV_POLICY_FILE, " ")])).unwrap();
        assert!(config.policy_file.is_none());
    }

    #[test]
    fn test_invalid_rate() {
        let err = TariffConfig::from_lookup(lookup(&[(ENV_SERVICE_FEE_RATE, "1.5")])).unwrap_err();
        assert!(matches!(err, TariffError::InvalidRate(_)));
    }

    #[test]
    fn test_invalid_currency() {
        let err = TariffConfig::from_lookup(lookup(&[(ENV_CURRENCY, "dollars")])).unwrap_err();
        assert!(matches!(err, TariffError::Config(_)));
    }

    #[test]
    fn test_seeded_table_uses_configured_currency() {
        let config = TariffConfig {
            currency: Currency::EUR,
            ..Default::default()
        };
        let table = config.policy_table().unwrap();
        assert_eq!(table.currency(), Currency::EUR);
    }

    #[test]
    fn test_missing_policy_file() {
        let config = TariffConfig {
            policy_file: Some(PathBuf::from("/nonexistent/tariff/policies.toml")),
            ..Default::default()
        };
        assert!(matches!(config.policy_table(), Err(TariffError::Io(_))));
    }
}
