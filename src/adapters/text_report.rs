//! Plain-text tables for a summary.

use crate::domain::error::BrandspendError;
use crate::domain::summary::Summary;
use crate::ports::report_port::ReportPort;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;

/// Shown in place of a value that has no data.
pub const PLACEHOLDER: &str = "-";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two decimals, half away from zero, comma-grouped: `1,234.50`.
pub fn format_currency(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// Comma-grouped integer: `12,345`.
pub fn format_integer(value: Option<u64>) -> String {
    match value {
        Some(n) => group_thousands(&n.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

fn write_table(
    out: &mut dyn Write,
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    writeln!(out, "=== {} ===", title)?;
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    writeln!(out, "{}", header_line.join("  ").trim_end())?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("  "))?;

    if rows.is_empty() {
        writeln!(out, "(no data)")?;
    }
    for row in rows {
        // First column is a label, the rest are right-aligned numbers.
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!("{:<w$}", cell, w = *w)
                } else {
                    format!("{:>w$}", cell, w = *w)
                }
            })
            .collect();
        writeln!(out, "{}", cells.join("  ").trim_end())?;
    }
    writeln!(out)?;
    Ok(())
}

pub struct TextReport;

impl ReportPort for TextReport {
    fn write(&self, summary: &Summary, out: &mut dyn Write) -> Result<(), BrandspendError> {
        let stats = &summary.overall_stats;
        let overall = vec![
            vec!["Total Spend".into(), format_currency(Some(stats.total_spend))],
            vec![
                "Average Transaction".into(),
                format_currency(stats.avg_transaction_amount),
            ],
            vec!["Max Spend".into(), format_currency(stats.max_spend)],
            vec!["Min Spend".into(), format_currency(stats.min_spend)],
            vec![
                "Number of Transactions".into(),
                format_integer(Some(stats.num_transactions)),
            ],
        ];
        write_table(out, "Overall Spend Statistics", &["Metric", "Value"], &overall)?;

        let brands: Vec<Vec<String>> = summary
            .top_brands
            .iter()
            .map(|b| {
                vec![
                    b.brand_name.clone(),
                    format_currency(Some(b.total_spend)),
                    format_currency(Some(b.avg_spend)),
                    format_integer(Some(b.num_transactions)),
                ]
            })
            .collect();
        write_table(
            out,
            "Top Brands by Spend",
            &["Brand", "Total Spend", "Average Spend", "Transactions"],
            &brands,
        )?;

        let industries: Vec<Vec<String>> = summary
            .spend_by_industry
            .iter()
            .map(|i| vec![i.industry_name.clone(), format_currency(Some(i.total_spend))])
            .collect();
        write_table(
            out,
            "Spend by Industry",
            &["Industry", "Total Spend"],
            &industries,
        )?;

        let states: Vec<Vec<String>> = summary
            .spend_by_state
            .iter()
            .map(|s| vec![s.state_abbr.clone(), format_currency(Some(s.total_spend))])
            .collect();
        write_table(out, "Spend by State", &["State", "Total Spend"], &states)?;

        let counts: Vec<Vec<String>> = summary
            .tx_count_by_industry
            .iter()
            .map(|c| {
                vec![
                    c.industry_name.clone(),
                    format_integer(Some(c.transaction_count)),
                ]
            })
            .collect();
        write_table(
            out,
            "Transaction Count by Industry",
            &["Industry", "Transaction Count"],
            &counts,
        )?;

        Ok(())
    }
}
