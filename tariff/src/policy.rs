//! Fee policy table.
//!
//! A [`FeePolicyTable`] is built once at start-up, either from the seeded
//! defaults or from a versioned TOML file, validated, and then shared by
//! reference with every calculator. There is no way to mutate it afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TariffError};
use crate::format::parse_amount;
use crate::money::{Currency, Money, Rate};

pub const STRIPE: &str = "stripe";
pub const CRYPTO_USDT: &str = "crypto_usdt";
pub const CRYPTO_LTC: &str = "crypto_ltc";
pub const WALLET_DEFAULT: &str = "wallet_default";
pub const PROTECTION_PLAN: &str = "protection_plan";
pub const PLATFORM_COMMISSION: &str = "platform_commission";

/// Version tag of the built-in table.
pub const SEEDED_VERSION: &str = "seeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Fee charged on a wallet payout.
    Withdrawal,
    /// Buyer-side discount applied at checkout.
    Protection,
    /// Platform cut taken from a seller's sale.
    Commission,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyKind::Withdrawal => "withdrawal",
            PolicyKind::Protection => "protection",
            PolicyKind::Commission => "commission",
        };
        f.write_str(s)
    }
}

/// Payout rails with a dedicated withdrawal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalMethod {
    Stripe,
    CryptoUsdt,
    CryptoLtc,
}

impl WithdrawalMethod {
    pub const ALL: [WithdrawalMethod; 3] = [
        WithdrawalMethod::Stripe,
        WithdrawalMethod::CryptoUsdt,
        WithdrawalMethod::CryptoLtc,
    ];

    pub fn policy_id(self) -> &'static str {
        match self {
            WithdrawalMethod::Stripe => STRIPE,
            WithdrawalMethod::CryptoUsdt => CRYPTO_USDT,
            WithdrawalMethod::CryptoLtc => CRYPTO_LTC,
        }
    }
}

impl FromStr for WithdrawalMethod {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            STRIPE => Ok(WithdrawalMethod::Stripe),
            CRYPTO_USDT => Ok(WithdrawalMethod::CryptoUsdt),
            CRYPTO_LTC => Ok(WithdrawalMethod::CryptoLtc),
            _ => Err(TariffError::UnknownPolicy(s.to_string())),
        }
    }
}

/// A flat + percentage fee rule with amount bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeePolicy {
    pub id: String,
    pub kind: PolicyKind,
    pub flat_fee: Money,
    pub percent_fee: Rate,
    pub min_amount: Money,
    pub max_amount: Option<Money>,
}

impl FeePolicy {
    /// `flat_fee + percent_fee * amount`, the percentage part rounded on its own.
    pub fn fee_for(&self, amount: Money) -> Result<Money> {
        self.flat_fee.add(amount.apply_rate(self.percent_fee)?)
    }

    fn invalid(&self, reason: impl Into<String>) -> TariffError {
        TariffError::InvalidPolicy {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self, currency: Currency) -> Result<()> {
        let amounts = [Some(self.flat_fee), Some(self.min_amount), self.max_amount];
        if amounts
            .iter()
            .flatten()
            .any(|m| m.currency() != currency)
        {
            return Err(self.invalid(format!("amounts must be in {currency}")));
        }
        if self.percent_fee.value() >= Decimal::ONE {
            return Err(self.invalid("percent_fee must be below 1"));
        }
        if let Some(max) = self.max_amount {
            if max.minor() < self.min_amount.minor() {
                return Err(self.invalid("max_amount is below min_amount"));
            }
        }
        if self.kind == PolicyKind::Withdrawal {
            // Net payout is affine with slope (1 - percent_fee); it must be
            // non-negative at the minimum for every in-range request to pay out.
            let net_at_min = self.min_amount.to_decimal() * (Decimal::ONE - self.percent_fee.value());
            if net_at_min < self.flat_fee.to_decimal() {
                return Err(self.invalid(format!(
                    "fee exceeds the minimum withdrawal of {}",
                    self.min_amount
                )));
            }
        }
        Ok(())
    }
}

/// Immutable, validated set of fee policies keyed by id.
#[derive(Debug, Clone, Serialize)]
pub struct FeePolicyTable {
    version: String,
    effective_from: Option<NaiveDate>,
    currency: Currency,
    policies: BTreeMap<String, FeePolicy>,
}

impl FeePolicyTable {
    /// Build and validate a table.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::InvalidPolicy` on a duplicate id or any policy
    /// that breaks a table invariant.
    pub fn new(
        version: impl Into<String>,
        effective_from: Option<NaiveDate>,
        currency: Currency,
        policies: Vec<FeePolicy>,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        for policy in policies {
            policy.validate(currency)?;
            if map.contains_key(&policy.id) {
                return Err(policy.invalid("duplicate policy id"));
            }
            map.insert(policy.id.clone(), policy);
        }
        let table = Self {
            version: version.into(),
            effective_from,
            currency,
            policies: map,
        };
        debug!(
            version = %table.version,
            currency = %table.currency,
            policies = table.policies.len(),
            "fee policy table loaded"
        );
        Ok(table)
    }

    /// The built-in policies observed across checkout and wallet flows.
    pub fn seeded(currency: Currency) -> Self {
        let m = |minor| Money::new(minor, currency);
        let policy = |id: &str, kind, flat, bps, min| FeePolicy {
            id: id.to_string(),
            kind,
            flat_fee: m(flat),
            percent_fee: Rate(Decimal::new(bps, 4)),
            min_amount: m(min),
            max_amount: None,
        };
        let policies = [
            policy(PROTECTION_PLAN, PolicyKind::Protection, 0, 500, 0),
            policy(PLATFORM_COMMISSION, PolicyKind::Commission, 0, 1000, 0),
            policy(STRIPE, PolicyKind::Withdrawal, 200, 400, 1_000),
            policy(CRYPTO_USDT, PolicyKind::Withdrawal, 1_000, 400, 5_000),
            policy(CRYPTO_LTC, PolicyKind::Withdrawal, 1_000, 400, 3_000),
            policy(WALLET_DEFAULT, PolicyKind::Withdrawal, 0, 200, 0),
        ];
        Self {
            version: SEEDED_VERSION.to_string(),
            effective_from: None,
            currency,
            policies: policies.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn effective_from(&self) -> Option<NaiveDate> {
        self.effective_from
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policies ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &FeePolicy> {
        self.policies.values()
    }

    /// # Errors
    ///
    /// Returns `TariffError::UnknownPolicy` if no policy has this id.
    pub fn get_policy(&self, id: &str) -> Result<&FeePolicy> {
        self.policies
            .get(id)
            .ok_or_else(|| TariffError::UnknownPolicy(id.to_string()))
    }

    /// Policy for a payout method, or the generic wallet policy when none is given.
    pub fn withdrawal_policy(&self, method: Option<&str>) -> Result<&FeePolicy> {
        match method {
            Some(id) => self.get_policy(id),
            None => {
                warn!(policy = WALLET_DEFAULT, "no withdrawal method given, using fallback policy");
                self.get_policy(WALLET_DEFAULT)
            }
        }
    }

    pub fn protection_plan(&self) -> Result<&FeePolicy> {
        self.get_policy(PROTECTION_PLAN)
    }

    pub fn platform_commission(&self) -> Result<&FeePolicy> {
        self.get_policy(PLATFORM_COMMISSION)
    }

    /// Parse a TOML policy file.
    ///
    /// ```toml
    /// version = "2026-10"
    /// effective_from = "2026-10-01"
    /// currency = "USD"
    ///
    /// [[policy]]
    /// id = "stripe"
    /// kind = "withdrawal"
    /// flat_fee = "2.00"
    /// percent_fee = "0.04"
    /// min_amount = "10.00"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: PolicyFile = toml::from_str(text)?;
        let currency = file.currency;
        let policies = file
            .policies
            .into_iter()
            .map(|entry| entry.into_policy(currency))
            .collect::<Result<Vec<_>>>()?;
        Self::new(file.version, file.effective_from, currency, policies)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for FeePolicyTable {
    fn default() -> Self {
        Self::seeded(Currency::USD)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    version: String,
    #[serde(default)]
    effective_from: Option<NaiveDate>,
    #[serde(default)]
    currency: Currency,
    #[serde(rename = "policy", default)]
    policies: Vec<PolicyEntry>,
}

/// Amounts are decimal strings so they go through the same sanitation as
/// user input.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyEntry {
    id: String,
    kind: PolicyKind,
    #[serde(default)]
    flat_fee: Option<String>,
    #[serde(default)]
    percent_fee: Option<Rate>,
    #[serde(default)]
    min_amount: Option<String>,
    #[serde(default)]
    max_amount: Option<String>,
}

impl PolicyEntry {
    fn into_policy(self, currency: Currency) -> Result<FeePolicy> {
        let amount = |raw: Option<String>| -> Result<Money> {
            match raw {
                Some(s) => parse_amount(&s, currency),
                None => Ok(Money::zero(currency)),
            }
        };
        Ok(FeePolicy {
            flat_fee: amount(self.flat_fee)?,
            percent_fee: self.percent_fee.unwrap_or(Rate::ZERO),
            min_amount: amount(self.min_amount)?,
            max_amount: self
                .max_amount
                .map(|s| parse_amount(&s, currency))
                .transpose()?,
            kind: self.kind,
            id: self.id,
        })
    }
}
