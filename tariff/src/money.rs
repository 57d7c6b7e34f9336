//! Fixed-point currency arithmetic.
//!
//! Amounts are held as an unsigned count of minor units (cents) so a `Money`
//! can never be negative. Rates are `rust_decimal::Decimal` values in `[0, 1]`
//! and every derived amount is rounded half-up to the nearest minor unit
//! exactly once.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TariffError};

/// Number of minor units per major unit. All supported currencies use 2 places.
pub const MINOR_PER_MAJOR: u64 = 100;

/// ISO-4217 style three-letter currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");

    /// Parse a currency code. Lowercase input is normalised to uppercase.
    pub fn new(code: &str) -> Result<Self> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(TariffError::Config(format!("invalid currency code: {code:?}")));
        }
        let mut out = [0u8; 3];
        for (dst, src) in out.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = TariffError;

    fn try_from(value: String) -> Result<Self> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.as_str().to_string()
    }
}

/// A fractional rate in `[0, 1]` (e.g. `0.04` for 4%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(pub(crate) Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// # Errors
    ///
    /// Returns `TariffError::InvalidRate` if `value` is outside `[0, 1]`.
    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(TariffError::InvalidRate(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

impl FromStr for Rate {
    type Err = TariffError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let value = Decimal::from_str_exact(trimmed)
            .map_err(|_| TariffError::InvalidRate(trimmed.to_string()))?;
        Rate::new(value)
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = TariffError;

    fn try_from(value: Decimal) -> Result<Self> {
        Rate::new(value)
    }
}

impl From<Rate> for Decimal {
    fn from(r: Rate) -> Self {
        r.0
    }
}

/// A non-negative amount of money in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: u64,
    currency: Currency,
}

impl Money {
    pub const fn new(minor: u64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Shorthand for a USD amount in cents.
    pub const fn usd(cents: u64) -> Self {
        Self::new(cents, Currency::USD)
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// The amount as a decimal in major units (`1234` cents -> `12.34`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.minor as i128, 2)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(TariffError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }

    pub fn add(self, other: Money) -> Result<Money> {
        self.ensure_same_currency(&other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or_else(|| TariffError::Overflow(format!("{self} + {other}")))?;
        Ok(Money::new(minor, self.currency))
    }

    /// # Errors
    ///
    /// Returns `TariffError::NegativeAmount` if `other` is larger than `self`.
    pub fn subtract(self, other: Money) -> Result<Money> {
        self.ensure_same_currency(&other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or_else(|| TariffError::NegativeAmount(format!("{self} - {other}")))?;
        Ok(Money::new(minor, self.currency))
    }

    /// Subtract, clamping at zero. Only for non-authoritative display values.
    pub fn saturating_sub(self, other: Money) -> Result<Money> {
        self.ensure_same_currency(&other)?;
        Ok(Money::new(self.minor.saturating_sub(other.minor), self.currency))
    }

    /// Multiply by `numerator / denominator`, rounding half-up once.
    pub fn multiply_by_rational(self, numerator: u64, denominator: u64) -> Result<Money> {
        if denominator == 0 {
            return Err(TariffError::InvalidRate(format!("{numerator}/0")));
        }
        let overflow = || TariffError::Overflow(format!("{self} * {numerator}/{denominator}"));
        let den = denominator as u128;
        let rounded = (self.minor as u128 * numerator as u128)
            .checked_mul(2)
            .and_then(|p| p.checked_add(den))
            .ok_or_else(overflow)?
            / (den * 2);
        let minor = u64::try_from(rounded).map_err(|_| overflow())?;
        Ok(Money::new(minor, self.currency))
    }

    /// `rate` of this amount, rounded half-up to a minor unit.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::InvalidRate` if `rate` is outside `[0, 1]`.
    pub fn percentage_of(self, rate: Decimal) -> Result<Money> {
        self.apply_rate(Rate::new(rate)?)
    }

    /// Same as [`Money::percentage_of`] for an already validated rate.
    pub fn apply_rate(self, rate: Rate) -> Result<Money> {
        let scaled = Decimal::from(self.minor)
            .checked_mul(rate.value())
            .ok_or_else(|| TariffError::Overflow(format!("{self} * {rate}")))?;
        let minor = scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or_else(|| TariffError::Overflow(format!("{self} * {rate}")))?;
        Ok(Money::new(minor, self.currency))
    }
}

impl PartialOrd for Money {
    /// Amounts in different currencies are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.minor.cmp(&other.minor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor / MINOR_PER_MAJOR,
            self.minor % MINOR_PER_MAJOR,
            self.currency
        )
    }
}
