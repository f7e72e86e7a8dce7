//! Consolidation passes: starting balances and payroll line items.

use std::collections::BTreeMap;

use crate::entry::{entry_sort, Entry, Split, SplitGroup};
use crate::utils::group_by;

const STARTING_BALANCE: &str = "Starting Balance";
const STARTING_BALANCES: &str = "Starting Balances";
const PAYROLL: &str = "Payroll";
const COMBINED_PAYROLL_MEMO: &str = "Combined payroll";

/// Merges every "Starting Balance" entry into one synthetic record on the
/// earliest entry: all non-expense splits, sorted by account name, closed
/// by one equity anchor split with an unresolved amount. The anchor is the
/// balance bridge; renderers omit its amount.
pub fn combine_starting_balance(entries: Vec<Entry>) -> Vec<Entry> {
    let (mut balances, remainder): (Vec<Entry>, Vec<Entry>) = entries
        .into_iter()
        .partition(|e| e.payee.as_deref() == Some(STARTING_BALANCE));
    if balances.is_empty() {
        return remainder;
    }
    balances.sort_by(entry_sort);

    let mut siblings = balances.into_iter();
    let Some(mut combined) = siblings.next() else {
        return remainder;
    };
    let mut splits: Vec<Split> = combined
        .splits
        .drain(..)
        .filter(|s| s.group != SplitGroup::Expenses)
        .collect();
    for sibling in siblings {
        splits.extend(
            sibling
                .splits
                .into_iter()
                .filter(|s| s.group != SplitGroup::Expenses),
        );
    }
    splits.sort_by(|a, b| a.name().cmp(&b.name()));
    splits.push(Split {
        group: SplitGroup::Equity,
        account: STARTING_BALANCES.to_string(),
        amount: None,
        memo: None,
    });
    combined.splits = splits;

    let mut out = vec![combined];
    out.extend(remainder);
    out
}

/// Merges payroll line items issued on the same day against the same
/// payroll account into one entry per day. Contributed splits inherit
/// their entry's memo when they have none; after concatenation, splits are
/// re-grouped by account path, payroll-tagged splits are dropped and
/// same-account income splits are summed into one.
pub fn combine_payroll(entries: Vec<Entry>) -> Vec<Entry> {
    let mut remainder = Vec::new();
    let mut groups: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        let key = (entry.payee.as_deref() != Some(STARTING_BALANCE))
            .then(|| {
                entry
                    .splits
                    .iter()
                    .find(|s| s.account.contains(PAYROLL))
                    .map(|s| s.account.clone())
            })
            .flatten();
        match key {
            Some(account) => groups.entry(account).or_default().push(entry),
            None => remainder.push(entry),
        }
    }

    let mut combined_entries = Vec::new();
    for (account, group) in groups {
        let payee = payee_from_account(&account);
        for (_, date_group) in group_by(group, |e| e.record_date) {
            let mut siblings = date_group.into_iter();
            let Some(mut combined) = siblings.next() else {
                continue;
            };
            let mut splits = Vec::new();
            absorb(&mut splits, combined.splits.drain(..).collect(), &combined.memo);
            for sibling in siblings {
                let memo = sibling.memo.clone();
                absorb(&mut splits, sibling.splits, &memo);
            }
            combined.memo = Some(COMBINED_PAYROLL_MEMO.to_string());
            combined.payee = Some(payee.clone());
            combined.splits = regroup(splits);
            combined_entries.push(combined);
        }
    }

    combined_entries.extend(remainder);
    combined_entries
}

/// The last two segments of the grouping account path, innermost first.
/// The path carries no group prefix, so a bare `Payroll` stays `Payroll`.
fn payee_from_account(account: &str) -> String {
    account
        .split(':')
        .rev()
        .take(2)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn absorb(splits: &mut Vec<Split>, contributed: Vec<Split>, default_memo: &Option<String>) {
    for mut split in contributed {
        if split.memo.is_none() {
            split.memo = default_memo.clone();
        }
        splits.push(split);
    }
}

fn regroup(splits: Vec<Split>) -> Vec<Split> {
    let mut out = Vec::new();
    for (name, group) in group_by(splits, |s| s.name()) {
        if name.contains(PAYROLL) {
            continue;
        }
        if name.starts_with("Income:") {
            let mut members = group.into_iter();
            let Some(mut merged) = members.next() else {
                continue;
            };
            for member in members {
                merged.amount = match (merged.amount, member.amount) {
                    (Some(a), Some(b)) => Some(a + b),
                    (Some(a), None) => Some(a),
                    (None, b) => b,
                };
            }
            out.push(merged);
        } else {
            out.extend(group);
        }
    }
    out
}
