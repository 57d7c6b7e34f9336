//! Loading the fee policy table from a TOML file.

use std::path::PathBuf;

use chrono::NaiveDate;
use tariff::policy::{CRYPTO_USDT, STRIPE};
use tariff::*;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/policies.toml")
}

#[test]
fn test_fixture_matches_seeded_table() {
    let loaded = FeePolicyTable::load(&fixture()).unwrap();
    let seeded = FeePolicyTable::default();

    assert_eq!(loaded.version(), "2026-10");
    assert_eq!(loaded.effective_from(), NaiveDate::from_ymd_opt(2026, 10, 1));
    assert_eq!(loaded.len(), seeded.len());

    for policy in seeded.iter() {
        let other = loaded.get_policy(&policy.id).unwrap();
        assert_eq!(other.kind, policy.kind, "{}", policy.id);
        assert_eq!(other.flat_fee, policy.flat_fee, "{}", policy.id);
        assert_eq!(other.percent_fee, policy.percent_fee, "{}", policy.id);
        assert_eq!(other.min_amount, policy.min_amount, "{}", policy.id);
    }
}

#[test]
fn test_fixture_maximum_is_enforced() {
    let table = FeePolicyTable::load(&fixture()).unwrap();
    let stripe = table.get_policy(STRIPE).unwrap();
    let balance = Money::usd(10_000_000);

    assert!(compute_withdrawal(Money::usd(1_000_000), stripe, balance).is_ok());
    assert!(matches!(
        compute_withdrawal(Money::usd(1_000_001), stripe, balance),
        Err(TariffError::AboveMaximum { .. })
    ));
}

#[test]
fn test_config_loads_policy_file() {
    let config = TariffConfig {
        policy_file: Some(fixture()),
        ..Default::default()
    };
    let table = config.policy_table().unwrap();
    let b = compute_withdrawal(
        Money::usd(5_000),
        table.get_policy(CRYPTO_USDT).unwrap(),
        Money::usd(5_000),
    )
    .unwrap();
    assert_eq!(b.net_amount, Money::usd(3_800));
}

#[test]
fn test_config_rejects_currency_mismatch() {
    let config = TariffConfig {
        currency: Currency::EUR,
        policy_file: Some(fixture()),
        ..Default::default()
    };
    let err = config.policy_table().unwrap_err();
    assert!(matches!(err, TariffError::Config(_)), "{err}");
}

#[test]
fn test_misconfigured_file_is_rejected() {
    let text = r#"
        version = "bad"

        [[policy]]
        id = "crypto_usdt"
        kind = "withdrawal"
        flat_fee = "10.00"
        percent_fee = "0.04"
        min_amount = "5.00"
    "#;
    let err = FeePolicyTable::from_toml_str(text).unwrap_err();
    assert!(
        matches!(err, TariffError::InvalidPolicy { ref id, .. } if id == "crypto_usdt"),
        "{err}"
    );
}

#[test]
fn test_table_serializes_for_inspection() {
    let table = FeePolicyTable::load(&fixture()).unwrap();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["version"], "2026-10");
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["policies"]["stripe"]["kind"], "withdrawal");
    assert_eq!(json["policies"]["stripe"]["percent_fee"], "0.04");
}
