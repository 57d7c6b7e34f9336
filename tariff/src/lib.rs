//! Pricing and fee engine for marketplace checkout, seller proceeds and
//! wallet withdrawals.
//!
//! Every calculator is a pure function over [`Money`] (integer minor units)
//! and a shared, read-only [`FeePolicyTable`].

pub mod config;
pub mod error;
pub mod format;
pub mod money;
pub mod order;
pub mod policy;
pub mod withdrawal;

// ---- Top-level re-exports for ergonomic usage ----

pub use config::TariffConfig;
pub use error::{Result, TariffError};

// Arithmetic
pub use money::{Currency, Money, Rate};

// Policies
pub use policy::{FeePolicy, FeePolicyTable, PolicyKind, WithdrawalMethod};

// Calculators
pub use order::{
    compute_order_total, compute_seller_proceeds, line_subtotal, OrderBreakdown, SaleBreakdown,
};
pub use withdrawal::{compute_withdrawal, compute_withdrawal_for_method, WithdrawalBreakdown};

// Display
pub use format::{
    format_minor, parse_amount, withdrawal_preview, AmountView,
    OrderBreakdownView, SaleBreakdownView, WithdrawalBreakdownView, WithdrawalPreview,
};
