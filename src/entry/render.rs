//! Conversion of finished entries into output rows for the plain-text
//! dialects. All domain decisions happen before this point; a renderer only
//! assembles the rows into lines.

use rust_decimal::Decimal;

use crate::entry::{split_sort, Entry, EntryKind, Split};
use crate::errors::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Ledger,
    Beancount,
}

impl OutputKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::Ledger => "ledger",
            OutputKind::Beancount => "beancount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub values: Vec<String>,
}

/// Produces one row per split, sorted deterministically.
///
/// A Budget entry has no beancount representation; asking for one is a
/// builder/formatter mismatch and must fail loudly rather than leak into
/// financial output.
pub fn entry_rows(entry: &Entry, output: OutputKind) -> Result<Vec<OutputRow>, ExportError> {
    let mut splits: Vec<&Split> = entry.splits.iter().collect();
    splits.sort_by(|a, b| split_sort(a, b));

    match output {
        OutputKind::Ledger => Ok(splits
            .iter()
            .map(|split| {
                let mut values = match entry.kind {
                    EntryKind::Transaction => vec![
                        split.name(),
                        format_amount(split.amount, &entry.currency),
                    ],
                    // Budget entries render as virtual postings.
                    EntryKind::Budget => vec![
                        format!("[{}]", split.name()),
                        split.amount.map(|a| a.to_string()).unwrap_or_default(),
                    ],
                };
                if let Some(memo) = &split.memo {
                    values.push(format!("; {memo}"));
                }
                OutputRow { values }
            })
            .collect()),
        OutputKind::Beancount => splits
            .iter()
            .map(|split| match entry.kind {
                EntryKind::Transaction => {
                    let amount = split
                        .amount
                        .map(|a| format!("{} {}", signed(a), entry.currency))
                        .unwrap_or_default();
                    let mut values = vec![beancount_account(&split.name()), amount];
                    if let Some(memo) = &split.memo {
                        values.push(format!("; {memo}"));
                    }
                    Ok(OutputRow { values })
                }
                EntryKind::Budget => Err(ExportError::UnsupportedOutput {
                    kind: entry.kind,
                    output: output.label().to_string(),
                }),
            })
            .collect(),
    }
}

pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        _ => None,
    }
}

fn format_amount(amount: Option<Decimal>, currency: &str) -> String {
    let Some(amount) = amount else {
        // The consolidation anchor carries no amount; omit the column.
        return String::new();
    };
    let symbol = currency_symbol(currency).unwrap_or("");
    if amount.is_sign_negative() {
        format!("-{symbol}{}", amount.abs())
    } else {
        format!(" {symbol}{amount}")
    }
}

fn signed(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("-{}", amount.abs())
    } else {
        format!(" {amount}")
    }
}

fn beancount_account(name: &str) -> String {
    name.replace(' ', "-").replace(['.', '\''], "")
}
