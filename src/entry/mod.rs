//! Domain model for double-entry records: an [`Entry`] and its balanced
//! [`Split`] line items.

pub mod render;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata key carrying the source transaction id.
pub const META_SOURCE_ID: &str = "ynab_id";
/// Metadata key linking a transfer entry to its counterpart's source id.
/// Present with a `None` value when the counterpart is a sub-transaction
/// rather than a standalone record.
pub const META_TRANSFER_ID: &str = "ynab_transfer_id";
/// Metadata key carrying the account matcher of an automatic budget entry.
pub const META_ACCOUNT_MATCHER: &str = "account_matcher";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Top-level double-entry account group.
pub enum SplitGroup {
    Assets,
    Equity,
    Expenses,
    Income,
    Liabilities,
}

impl SplitGroup {
    /// Parses the leading segment of a colon-delimited target path.
    pub fn parse(name: &str) -> Option<SplitGroup> {
        match name {
            "Assets" => Some(SplitGroup::Assets),
            "Equity" => Some(SplitGroup::Equity),
            "Expenses" => Some(SplitGroup::Expenses),
            "Income" => Some(SplitGroup::Income),
            "Liabilities" => Some(SplitGroup::Liabilities),
            _ => None,
        }
    }
}

impl fmt::Display for SplitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitGroup::Assets => "Assets",
            SplitGroup::Equity => "Equity",
            SplitGroup::Expenses => "Expenses",
            SplitGroup::Income => "Income",
            SplitGroup::Liabilities => "Liabilities",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One line of a double-entry record.
pub struct Split {
    pub group: SplitGroup,
    pub account: String,
    /// `None` only for the synthetic consolidation anchor split; resolved
    /// amounts of one entry must sum to zero.
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Split {
    pub fn new(group: SplitGroup, account: impl Into<String>, amount: Decimal) -> Self {
        Self {
            group,
            account: account.into(),
            amount: Some(amount),
            memo: None,
        }
    }

    /// Full colon-delimited account path including the group segment.
    pub fn name(&self) -> String {
        format!("{}:{}", self.group, self.account)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Discriminates the two entry variants; passes dispatch on this tag.
pub enum EntryKind {
    Transaction,
    Budget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// An atomic accounting record.
///
/// Created once by a builder from exactly one source record, then mutated
/// by transformation passes; ids are deterministic v5 hashes of the source
/// record's natural key so re-exports diff cleanly.
pub struct Entry {
    pub kind: EntryKind,
    pub id: Uuid,
    pub record_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub currency: String,
    pub cleared: bool,
    pub splits: Vec<Split>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Option<String>>,
}

impl Entry {
    /// Sum of all resolved split amounts; zero for a balanced entry.
    pub fn balance(&self) -> Decimal {
        self.splits.iter().filter_map(|s| s.amount).sum()
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_deref())
    }

    /// True when the metadata key exists, even with a `None` value.
    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    pub fn sort_splits(&mut self) {
        self.splits.sort_by(split_sort);
    }
}

/// Deterministic split order: amount ascending, unresolved amounts last,
/// account name as tie-break.
pub fn split_sort(a: &Split, b: &Split) -> Ordering {
    match (a.amount, b.amount) {
        (Some(x), Some(y)) if x != y => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => a.account.cmp(&b.account),
    }
}

/// Deterministic entry order: record date ascending, id as tie-break.
///
/// Uuid byte order matches the lexicographic order of the hyphenated
/// string form, so the tie-break is stable across runs.
pub fn entry_sort(a: &Entry, b: &Entry) -> Ordering {
    a.record_date
        .cmp(&b.record_date)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stable_id;
    use rust_decimal_macros::dec;

    fn entry_with(date: &str, id_key: &str) -> Entry {
        Entry {
            kind: EntryKind::Transaction,
            id: stable_id(id_key),
            record_date: date.parse().unwrap(),
            payee: None,
            memo: None,
            currency: "USD".into(),
            cleared: true,
            splits: vec![
                Split::new(SplitGroup::Assets, "Checking:Main", dec!(50.00)),
                Split::new(SplitGroup::Expenses, "Food:Groceries", dec!(-50.00)),
            ],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn balanced_entry_sums_to_zero() {
        assert_eq!(entry_with("2023-01-01", "a").balance(), dec!(0));
    }

    #[test]
    fn split_sort_orders_amount_ascending_with_account_tiebreak() {
        let mut splits = vec![
            Split::new(SplitGroup::Assets, "B", dec!(10)),
            Split::new(SplitGroup::Assets, "A", dec!(10)),
            Split::new(SplitGroup::Expenses, "C", dec!(-10)),
        ];
        splits.sort_by(split_sort);
        let accounts: Vec<&str> = splits.iter().map(|s| s.account.as_str()).collect();
        assert_eq!(accounts, vec!["C", "A", "B"]);
    }

    #[test]
    fn unresolved_amounts_sort_last() {
        let anchor = Split {
            group: SplitGroup::Equity,
            account: "Starting Balances".into(),
            amount: None,
            memo: None,
        };
        let mut splits = vec![anchor, Split::new(SplitGroup::Assets, "A", dec!(1))];
        splits.sort_by(split_sort);
        assert!(splits[1].amount.is_none());
    }

    #[test]
    fn entry_sort_breaks_date_ties_by_id() {
        let a = entry_with("2023-01-01", "a");
        let b = entry_with("2023-01-01", "b");
        let expected = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
        let mut entries = vec![b, a];
        entries.sort_by(entry_sort);
        assert_eq!((entries[0].id, entries[1].id), expected);
    }

    #[test]
    fn entry_sort_orders_by_date_first() {
        let mut entries = vec![entry_with("2023-02-01", "a"), entry_with("2023-01-01", "b")];
        entries.sort_by(entry_sort);
        assert_eq!(entries[0].record_date.to_string(), "2023-01-01");
    }
}
