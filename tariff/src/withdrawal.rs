//! Wallet payout fees.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TariffError};
use crate::money::Money;
use crate::policy::{FeePolicy, FeePolicyTable, PolicyKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalBreakdown {
    pub requested_amount: Money,
    pub fee: Money,
    pub net_amount: Money,
    /// Id of the policy the fee was computed with.
    pub method: String,
}

impl WithdrawalBreakdown {
    /// `net_amount == requested_amount - fee`.
    pub fn is_balanced(&self) -> bool {
        self.requested_amount.minor().checked_sub(self.fee.minor()) == Some(self.net_amount.minor())
    }
}

/// Compute the payout for a withdrawal request.
///
/// Checks run in this order: amount and policy sanity, minimum, maximum,
/// fee against amount, then available balance.
///
/// # Errors
///
/// * `TariffError::InvalidAmount` if `requested` is zero.
/// * `TariffError::InvalidPolicy` if `policy` is not a withdrawal policy.
/// * `TariffError::CurrencyMismatch` if the amounts disagree on currency.
/// * `TariffError::BelowMinimum` / `TariffError::AboveMaximum` for
///   out-of-range requests.
/// * `TariffError::FeeExceedsAmount` if the fee is larger than the request.
/// * `TariffError::InsufficientBalance` if `requested > available_balance`.
pub fn compute_withdrawal(
    requested: Money,
    policy: &FeePolicy,
    available_balance: Money,
) -> Result<WithdrawalBreakdown> {
    if policy.kind != PolicyKind::Withdrawal {
        return Err(TariffError::InvalidPolicy {
            id: policy.id.clone(),
            reason: format!("expected a withdrawal policy, got {}", policy.kind),
        });
    }
    if requested.is_zero() {
        return Err(TariffError::InvalidAmount(
            "withdrawal amount must be positive".into(),
        ));
    }
    for other in [policy.min_amount, available_balance] {
        if other.currency() != requested.currency() {
            return Err(TariffError::CurrencyMismatch {
                left: requested.currency().to_string(),
                right: other.currency().to_string(),
            });
        }
    }

    if requested.minor() < policy.min_amount.minor() {
        return Err(TariffError::BelowMinimum {
            policy: policy.id.clone(),
            requested: requested.to_string(),
            minimum: policy.min_amount.to_string(),
        });
    }
    if let Some(max) = policy.max_amount {
        if requested.minor() > max.minor() {
            return Err(TariffError::AboveMaximum {
                policy: policy.id.clone(),
                requested: requested.to_string(),
                maximum: max.to_string(),
            });
        }
    }

    let fee = policy.fee_for(requested)?;
    let net_amount = requested
        .subtract(fee)
        .map_err(|_| TariffError::FeeExceedsAmount {
            policy: policy.id.clone(),
            amount: requested.to_string(),
            fee: fee.to_string(),
        })?;

    if requested.minor() > available_balance.minor() {
        return Err(TariffError::InsufficientBalance {
            requested: requested.to_string(),
            available: available_balance.to_string(),
        });
    }

    debug!(
        method = %policy.id,
        requested = %requested,
        fee = %fee,
        net = %net_amount,
        "withdrawal computed"
    );
    Ok(WithdrawalBreakdown {
        requested_amount: requested,
        fee,
        net_amount,
        method: policy.id.clone(),
    })
}

/// Look up the policy for `method` (or the wallet fallback) and compute the payout.
pub fn compute_withdrawal_for_method(
    table: &FeePolicyTable,
    method: Option<&str>,
    requested: Money,
    available_balance: Money,
) -> Result<WithdrawalBreakdown> {
    let policy = table.withdrawal_policy(method)?;
    compute_withdrawal(requested, policy, available_balance)
}
