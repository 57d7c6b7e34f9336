use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tariff::WithdrawalMethod;

/// tariff: price checkouts, seller proceeds and wallet withdrawals.
#[derive(Parser, Debug)]
#[command(name = "tariff", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Output as JSON instead of TSV
    #[arg(long, global = true)]
    pub json: bool,

    /// Fee policy TOML file (overrides TARIFF_POLICY_FILE)
    #[arg(long, global = true)]
    pub policies: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Price an order for the buyer
    Order(OrderArgs),

    /// Compute the payout for a withdrawal request
    Withdraw(WithdrawArgs),

    /// Show the live "you receive" estimate for a withdrawal form
    Preview(PreviewArgs),

    /// Compute what a seller nets from a sale
    Proceeds(ProceedsArgs),

    /// List the loaded fee policies
    Policies,
}

/// Arguments for the `order` subcommand.
#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Listing unit price (e.g. 45.00)
    pub price: String,

    /// Number of units
    #[arg(long, default_value = "1")]
    pub quantity: u32,

    /// Apply the buyer protection plan discount
    #[arg(long)]
    pub protection: bool,

    /// Service fee rate in [0, 1] (defaults to TARIFF_SERVICE_FEE_RATE or 0.10)
    #[arg(long)]
    pub service_fee_rate: Option<String>,
}

/// Arguments for the `withdraw` subcommand.
#[derive(Parser, Debug)]
pub struct WithdrawArgs {
    /// Requested payout amount
    pub amount: String,

    /// Available wallet balance
    #[arg(long)]
    pub balance: String,

    /// Payout method; the generic wallet policy applies when omitted
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
}

/// Arguments for the `preview` subcommand.
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Amount typed into the form so far
    pub amount: String,

    /// Payout method; the generic wallet policy applies when omitted
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
}

/// Arguments for the `proceeds` subcommand.
#[derive(Parser, Debug)]
pub struct ProceedsArgs {
    /// Sale amount paid by the buyer
    pub sale_amount: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum MethodArg {
    Stripe,
    CryptoUsdt,
    CryptoLtc,
}

impl From<MethodArg> for WithdrawalMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Stripe => WithdrawalMethod::Stripe,
            MethodArg::CryptoUsdt => WithdrawalMethod::CryptoUsdt,
            MethodArg::CryptoLtc => WithdrawalMethod::CryptoLtc,
        }
    }
}
