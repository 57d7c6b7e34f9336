//! Amount parsing and display.
//!
//! User-entered strings are sanitised here before any [`Money`] exists, and
//! breakdowns are turned into serialisable views carrying both the minor-unit
//! integer and a `"45.00"` style display string.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TariffError};
use crate::money::{Currency, Money, MINOR_PER_MAJOR};
use crate::order::{OrderBreakdown, SaleBreakdown};
use crate::policy::FeePolicy;
use crate::withdrawal::WithdrawalBreakdown;

/// Maximum number of digits accepted after the decimal point.
pub const MAX_DECIMALS: usize = 2;

/// Parse a user-entered amount such as `"45"`, `"45.5"` or `"45.50"`.
///
/// # Errors
///
/// * `TariffError::MalformedAmount` for empty, non-numeric, non-finite,
///   over-precise (more than two decimals) or overflowing input.
/// * `TariffError::InvalidAmount` for a negative value.
pub fn parse_amount(input: &str, currency: Currency) -> Result<Money> {
    let trimmed = input.trim();
    let malformed = |why: &str| TariffError::MalformedAmount(format!("{trimmed:?}: {why}"));

    if trimmed.is_empty() {
        return Err(malformed("empty"));
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let lower = digits.to_ascii_lowercase();
    if matches!(lower.as_str(), "nan" | "inf" | "infinity") {
        return Err(malformed("not a finite number"));
    }

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("not a number"));
    }
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("not a number"));
        }
        if frac.len() > MAX_DECIMALS {
            return Err(malformed("more than 2 decimal places"));
        }
    }

    let value = Decimal::from_str_exact(digits).map_err(|_| malformed("out of range"))?;
    if negative && !value.is_zero() {
        return Err(TariffError::InvalidAmount(format!("{trimmed} is negative")));
    }
    decimal_to_money(value, currency).ok_or_else(|| malformed("out of range"))
}

fn decimal_to_money(value: Decimal, currency: Currency) -> Option<Money> {
    let minor = value
        .checked_mul(Decimal::from(MINOR_PER_MAJOR))?
        .to_u64()?;
    Some(Money::new(minor, currency))
}

/// `4500` -> `"45.00"`.
pub fn format_minor(minor: u64) -> String {
    format!("{}.{:02}", minor / MINOR_PER_MAJOR, minor % MINOR_PER_MAJOR)
}

/// One amount as shown to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountView {
    pub minor: u64,
    pub display: String,
    pub currency: Currency,
}

impl From<Money> for AmountView {
    fn from(m: Money) -> Self {
        Self {
            minor: m.minor(),
            display: format_minor(m.minor()),
            currency: m.currency(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBreakdownView {
    pub subtotal: AmountView,
    pub protection_discount: AmountView,
    pub target_amount: AmountView,
    pub service_fee: AmountView,
    pub total: AmountView,
}

impl From<&OrderBreakdown> for OrderBreakdownView {
    fn from(b: &OrderBreakdown) -> Self {
        Self {
            subtotal: b.subtotal.into(),
            protection_discount: b.protection_discount.into(),
            target_amount: b.target_amount.into(),
            service_fee: b.service_fee.into(),
            total: b.total.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalBreakdownView {
    pub method: String,
    pub requested_amount: AmountView,
    pub fee: AmountView,
    pub net_amount: AmountView,
}

impl From<&WithdrawalBreakdown> for WithdrawalBreakdownView {
    fn from(b: &WithdrawalBreakdown) -> Self {
        Self {
            method: b.method.clone(),
            requested_amount: b.requested_amount.into(),
            fee: b.fee.into(),
            net_amount: b.net_amount.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleBreakdownView {
    pub gross: AmountView,
    pub commission: AmountView,
    pub net: AmountView,
}

impl From<&SaleBreakdown> for SaleBreakdownView {
    fn from(b: &SaleBreakdown) -> Self {
        Self {
            gross: b.gross.into(),
            commission: b.commission.into(),
            net: b.net.into(),
        }
    }
}

/// Live "you receive" figure for a withdrawal form.
///
/// Not a payable amount: `you_receive` is clamped to zero and no bounds or
/// balance checks are applied. Use `compute_withdrawal` before paying out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPreview {
    pub method: String,
    pub requested: AmountView,
    pub fee: AmountView,
    pub you_receive: AmountView,
    /// Set when the fee exceeded the requested amount.
    pub clamped: bool,
}

pub fn withdrawal_preview(requested: Money, policy: &FeePolicy) -> Result<WithdrawalPreview> {
    let fee = policy.fee_for(requested)?;
    let you_receive = requested.saturating_sub(fee)?;
    Ok(WithdrawalPreview {
        method: policy.id.clone(),
        requested: requested.into(),
        fee: fee.into(),
        you_receive: you_receive.into(),
        clamped: fee.minor() > requested.minor(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FeePolicyTable, CRYPTO_USDT, STRIPE};

    fn usd(s: &str) -> Result<Money> {
        parse_amount(s, Currency::USD)
    }

    // ---- parse_amount ----

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(usd("45").unwrap(), Money::usd(4_500));
        assert_eq!(usd("45.5").unwrap(), Money::usd(4_550));
        assert_eq!(usd("45.05").unwrap(), Money::usd(4_505));
        assert_eq!(usd(" 0.01 ").unwrap(), Money::usd(1));
        assert_eq!(usd("+3.10").unwrap(), Money::usd(310));
        assert_eq!(usd("0").unwrap(), Money::usd(0));
        assert_eq!(usd("-0").unwrap(), Money::usd(0));
    }

    #[test]
    fn test_parse_amount_too_many_decimals() {
        assert!(matches!(usd("1.005"), Err(TariffError::MalformedAmount(_))));
        assert!(matches!(usd("1.000"), Err(TariffError::MalformedAmount(_))));
    }

    #[test]
    fn test_parse_amount_non_finite() {
        for s in ["NaN", "nan", "inf", "-Infinity", "+inf"] {
            assert!(
                matches!(usd(s), Err(TariffError::MalformedAmount(_))),
                "{s} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_amount_not_numeric() {
        for s in ["", "  ", "abc", "1,000", "1e3", "$5", ".5", "5.", "1.2.3", "--1"] {
            assert!(
                matches!(usd(s), Err(TariffError::MalformedAmount(_))),
                "{s:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_amount_negative() {
        assert!(matches!(usd("-5.00"), Err(TariffError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_amount_overflow() {
        assert!(matches!(
            usd("184467440737095516.16"),
            Err(TariffError::MalformedAmount(_))
        ));
        assert!(matches!(
            usd("99999999999999999999999999999999"),
            Err(TariffError::MalformedAmount(_))
        ));
    }

    // ---- format_minor ----

    #[test]
    fn test_format_minor() {
        assert_eq!(format_minor(4_500), "45.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(0), "0.00");
        assert_eq!(format_minor(123_456_789), "1234567.89");
    }

    #[test]
    fn test_format_then_parse_round_trip() {
        for minor in [0, 1, 9, 10, 99, 100, 101, 4_500, 999_999, 1_000_000_007] {
            let shown = format_minor(minor);
            assert_eq!(usd(&shown).unwrap().minor(), minor, "{shown}");
        }
    }

    #[test]
    fn test_amount_view_json() {
        let view = AmountView::from(Money::usd(4_500));
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(json, r#"{"minor":4500,"display":"45.00","currency":"USD"}"#);
    }

    // ---- withdrawal_preview ----

    #[test]
    fn test_preview_matches_breakdown_in_range() {
        let table = FeePolicyTable::default();
        let preview = withdrawal_preview(Money::usd(10_000), table.get_policy(STRIPE).unwrap())
            .unwrap();
        assert_eq!(preview.fee.display, "6.00");
        assert_eq!(preview.you_receive.display, "94.00");
        assert!(!preview.clamped);
    }

    #[test]
    fn test_preview_clamps_below_minimum() {
        // $5 into crypto_usdt: fee $10.20 exceeds the request.
        let table = FeePolicyTable::default();
        let preview =
            withdrawal_preview(Money::usd(500), table.get_policy(CRYPTO_USDT).unwrap()).unwrap();
        assert_eq!(preview.fee.minor, 1_020);
        assert_eq!(preview.you_receive.minor, 0);
        assert!(preview.clamped);
    }
}
