use std::io::Write;

use serde::Serialize;
use tariff::{
    format_minor, FeePolicyTable, Money, OrderBreakdown, OrderBreakdownView, SaleBreakdown,
    SaleBreakdownView, WithdrawalBreakdown, WithdrawalBreakdownView, WithdrawalPreview,
};

use crate::error::CliError;

/// Write a breakdown as `field \t amount \t currency` rows, or as one JSON line.
fn write_breakdown<W: Write, V: Serialize>(
    writer: &mut W,
    rows: &[(&str, Money)],
    view: &V,
    json_mode: bool,
) -> Result<(), CliError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, view)?;
        writeln!(writer)?;
    } else {
        for (field, amount) in rows {
            writeln!(
                writer,
                "{field}\t{}\t{}",
                format_minor(amount.minor()),
                amount.currency()
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_order<W: Write>(
    writer: &mut W,
    b: &OrderBreakdown,
    json_mode: bool,
) -> Result<(), CliError> {
    let rows = [
        ("subtotal", b.subtotal),
        ("protection_discount", b.protection_discount),
        ("target_amount", b.target_amount),
        ("service_fee", b.service_fee),
        ("total", b.total),
    ];
    write_breakdown(writer, &rows, &OrderBreakdownView::from(b), json_mode)
}

pub fn write_withdrawal<W: Write>(
    writer: &mut W,
    b: &WithdrawalBreakdown,
    json_mode: bool,
) -> Result<(), CliError> {
    let rows = [
        ("requested_amount", b.requested_amount),
        ("fee", b.fee),
        ("net_amount", b.net_amount),
    ];
    write_breakdown(writer, &rows, &WithdrawalBreakdownView::from(b), json_mode)
}

pub fn write_proceeds<W: Write>(
    writer: &mut W,
    b: &SaleBreakdown,
    json_mode: bool,
) -> Result<(), CliError> {
    let rows = [("gross", b.gross), ("commission", b.commission), ("net", b.net)];
    write_breakdown(writer, &rows, &SaleBreakdownView::from(b), json_mode)
}

pub fn write_preview<W: Write>(
    writer: &mut W,
    p: &WithdrawalPreview,
    json_mode: bool,
) -> Result<(), CliError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, p)?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "requested\t{}\t{}", p.requested.display, p.requested.currency)?;
        writeln!(writer, "fee\t{}\t{}", p.fee.display, p.fee.currency)?;
        writeln!(writer, "you_receive\t{}\t{}", p.you_receive.display, p.you_receive.currency)?;
        if p.clamped {
            writeln!(writer, "note\tfee exceeds the requested amount")?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// TSV: id \t kind \t flat_fee \t percent_fee \t min_amount \t max_amount
pub fn write_policies<W: Write>(
    writer: &mut W,
    table: &FeePolicyTable,
    json_mode: bool,
) -> Result<(), CliError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, table)?;
        writeln!(writer)?;
    } else {
        for p in table.iter() {
            let max = p
                .max_amount
                .map(|m| format_minor(m.minor()))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                p.id,
                p.kind,
                format_minor(p.flat_fee.minor()),
                p.percent_fee,
                format_minor(p.min_amount.minor()),
                max
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tariff::policy::{CRYPTO_USDT, STRIPE};
    use tariff::{compute_order_total, compute_withdrawal, withdrawal_preview};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), CliError>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn order() -> OrderBreakdown {
        compute_order_total(
            &FeePolicyTable::default(),
            Money::usd(10_000),
            true,
            Decimal::new(10, 2),
        )
        .unwrap()
    }

    #[test]
    fn test_order_tsv() {
        let out = render(|w| write_order(w, &order(), false));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "subtotal\t100.00\tUSD");
        assert_eq!(lines[1], "protection_discount\t5.00\tUSD");
        assert_eq!(lines[4], "total\t104.50\tUSD");
    }

    #[test]
    fn test_order_json() {
        let out = render(|w| write_order(w, &order(), true));
        assert!(out.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["serviceFee"]["display"], "9.50");
    }

    #[test]
    fn test_withdrawal_tsv() {
        let table = FeePolicyTable::default();
        let b = compute_withdrawal(
            Money::usd(10_000),
            table.get_policy(STRIPE).unwrap(),
            Money::usd(10_000),
        )
        .unwrap();
        let out = render(|w| write_withdrawal(w, &b, false));
        assert_eq!(
            out,
            "requested_amount\t100.00\tUSD\nfee\t6.00\tUSD\nnet_amount\t94.00\tUSD\n"
        );
    }

    #[test]
    fn test_preview_notes_clamp() {
        let table = FeePolicyTable::default();
        let p = withdrawal_preview(Money::usd(500), table.get_policy(CRYPTO_USDT).unwrap())
            .unwrap();
        let out = render(|w| write_preview(w, &p, false));
        assert!(out.contains("you_receive\t0.00\tUSD"));
        assert!(out.contains("note\t"));
    }

    #[test]
    fn test_policies_tsv() {
        let out = render(|w| write_policies(w, &FeePolicyTable::default(), false));
        let stripe = out
            .lines()
            .find(|l| l.starts_with("stripe\t"))
            .expect("stripe row");
        assert_eq!(stripe, "stripe\twithdrawal\t2.00\t4%\t10.00\t-");
    }
}
