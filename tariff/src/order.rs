//! Buyer checkout totals and seller sale proceeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TariffError};
use crate::money::{Money, Rate};
use crate::policy::{FeePolicy, FeePolicyTable, PolicyKind};

/// Buyer-facing price breakdown for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBreakdown {
    pub subtotal: Money,
    pub protection_discount: Money,
    /// `subtotal - protection_discount`, the base the service fee is charged on.
    pub target_amount: Money,
    pub service_fee: Money,
    pub total: Money,
}

impl OrderBreakdown {
    /// `total == subtotal - protection_discount + service_fee`.
    pub fn is_balanced(&self) -> bool {
        let target = self.subtotal.minor().checked_sub(self.protection_discount.minor());
        target == Some(self.target_amount.minor())
            && self.target_amount.minor().checked_add(self.service_fee.minor())
                == Some(self.total.minor())
    }
}

/// Price the order for the buyer.
///
/// The protection discount comes from the table's protection-plan policy.
/// The service fee is charged on the discounted amount.
///
/// # Errors
///
/// * `TariffError::InvalidAmount` if `subtotal` is zero.
/// * `TariffError::InvalidRate` if `service_fee_rate` is outside `[0, 1]`.
/// * `TariffError::UnknownPolicy` if the table has no protection-plan policy
///   and the plan is active.
pub fn compute_order_total(
    table: &FeePolicyTable,
    subtotal: Money,
    protection_plan_active: bool,
    service_fee_rate: Decimal,
) -> Result<OrderBreakdown> {
    if subtotal.is_zero() {
        return Err(TariffError::InvalidAmount(
            "order subtotal must be positive".into(),
        ));
    }
    let service_fee_rate = Rate::new(service_fee_rate)?;

    let protection_discount = if protection_plan_active {
        let plan = table.protection_plan()?;
        subtotal.apply_rate(plan.percent_fee)?
    } else {
        Money::zero(subtotal.currency())
    };
    let target_amount = subtotal.subtract(protection_discount)?;
    let service_fee = target_amount.apply_rate(service_fee_rate)?;
    let total = target_amount.add(service_fee)?;

    let breakdown = OrderBreakdown {
        subtotal,
        protection_discount,
        target_amount,
        service_fee,
        total,
    };
    debug!(
        subtotal = %subtotal,
        protection_plan_active,
        rate = %service_fee_rate,
        total = %total,
        "order priced"
    );
    Ok(breakdown)
}

/// Listing price times quantity.
pub fn line_subtotal(unit_price: Money, quantity: u32) -> Result<Money> {
    if quantity == 0 {
        return Err(TariffError::InvalidAmount("quantity must be at least 1".into()));
    }
    unit_price.multiply_by_rational(quantity as u64, 1)
}

/// What a seller nets from a completed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleBreakdown {
    pub gross: Money,
    pub commission: Money,
    pub net: Money,
}

impl SaleBreakdown {
    pub fn is_balanced(&self) -> bool {
        self.gross.minor().checked_sub(self.commission.minor()) == Some(self.net.minor())
    }
}

/// Apply a commission policy to a sale amount.
///
/// # Errors
///
/// * `TariffError::InvalidAmount` if `sale_amount` is zero.
/// * `TariffError::InvalidPolicy` if `policy` is not a commission policy.
/// * `TariffError::FeeExceedsAmount` if the commission would exceed the sale.
pub fn compute_seller_proceeds(sale_amount: Money, policy: &FeePolicy) -> Result<SaleBreakdown> {
    if policy.kind != PolicyKind::Commission {
        return Err(TariffError::InvalidPolicy {
            id: policy.id.clone(),
            reason: format!("expected a commission policy, got {}", policy.kind),
        });
    }
    if sale_amount.is_zero() {
        return Err(TariffError::InvalidAmount("sale amount must be positive".into()));
    }

    let commission = policy.fee_for(sale_amount)?;
    let net = sale_amount
        .subtract(commission)
        .map_err(|_| TariffError::FeeExceedsAmount {
            policy: policy.id.clone(),
            amount: sale_amount.to_string(),
            fee: commission.to_string(),
        })?;

    debug!(gross = %sale_amount, commission = %commission, net = %net, "seller proceeds computed");
    Ok(SaleBreakdown {
        gross: sale_amount,
        commission,
        net,
    })
}
