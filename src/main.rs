mod cli;
mod error;
mod output;

use std::io;

use clap::Parser;
use cli::Command;
use error::CliError;
use tariff::{
    compute_order_total, compute_seller_proceeds, compute_withdrawal_for_method, line_subtotal,
    parse_amount, withdrawal_preview, Rate, TariffConfig, WithdrawalMethod,
};
use tracing::{debug, info};

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "tariff failed");
        std::process::exit(1);
    }
}

fn run(cli: cli::Cli) -> Result<(), CliError> {
    let mut config = TariffConfig::from_env()?;
    if let Some(path) = cli.policies {
        config.policy_file = Some(path);
    }

    let table = config.policy_table()?;
    info!(
        version = table.version(),
        currency = %table.currency(),
        policies = table.len(),
        "fee policies ready"
    );

    let currency = config.currency;
    let json = cli.json;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Order(args) => {
            let unit_price = parse_amount(&args.price, currency)?;
            let subtotal = line_subtotal(unit_price, args.quantity)?;
            let rate = match args.service_fee_rate {
                Some(raw) => raw.parse::<Rate>()?,
                None => config.service_fee_rate,
            };
            debug!(%subtotal, quantity = args.quantity, "pricing order");
            let breakdown =
                compute_order_total(&table, subtotal, args.protection, rate.value())?;
            output::write_order(&mut out, &breakdown, json)?;
        }

        Command::Withdraw(args) => {
            let requested = parse_amount(&args.amount, currency)?;
            let balance = parse_amount(&args.balance, currency)?;
            let method = args.method.map(|m| WithdrawalMethod::from(m).policy_id());
            let breakdown = compute_withdrawal_for_method(&table, method, requested, balance)?;
            output::write_withdrawal(&mut out, &breakdown, json)?;
        }

        Command::Preview(args) => {
            let requested = parse_amount(&args.amount, currency)?;
            let method = args.method.map(|m| WithdrawalMethod::from(m).policy_id());
            let policy = table.withdrawal_policy(method)?;
            let preview = withdrawal_preview(requested, policy)?;
            output::write_preview(&mut out, &preview, json)?;
        }

        Command::Proceeds(args) => {
            let sale_amount = parse_amount(&args.sale_amount, currency)?;
            let breakdown = compute_seller_proceeds(sale_amount, table.platform_commission()?)?;
            output::write_proceeds(&mut out, &breakdown, json)?;
        }

        Command::Policies => {
            output::write_policies(&mut out, &table, json)?;
        }
    }

    Ok(())
}
