//! Resolves leftover `Uncategorized` expense splits through the configured
//! category mappings.

use crate::config::Configuration;
use crate::entry::{Entry, SplitGroup};
use crate::source::ynab::resolver::UNCATEGORIZED;

/// For each expense split still in an `Uncategorized` bucket, the first
/// mapping whose payee/memo matcher admits the entry rewrites the split's
/// group and account. A `{payee}` placeholder in the target expands to the
/// entry's payee. The split's own memo takes precedence over the entry
/// memo when matching.
pub fn map_category(config: &Configuration, mut entries: Vec<Entry>) -> Vec<Entry> {
    if config.mappings.is_empty() {
        return entries;
    }
    for entry in &mut entries {
        let payee = entry.payee.clone();
        let entry_memo = entry.memo.clone();
        for split in &mut entry.splits {
            if split.group != SplitGroup::Expenses || !is_uncategorized(&split.account) {
                continue;
            }
            let memo = split.memo.as_deref().or(entry_memo.as_deref());
            let matched = config
                .mappings
                .iter()
                .find(|m| m.0.matches(payee.as_deref(), memo));
            if let Some(mapping) = matched {
                let target = mapping.1.replace("{payee}", payee.as_deref().unwrap_or_default());
                let (group, account) = parse_target(&target);
                split.group = group;
                split.account = account;
            }
        }
    }
    entries
}

fn is_uncategorized(account: &str) -> bool {
    account == UNCATEGORIZED || account.ends_with(":Uncategorized")
}

/// A target whose leading segment names a group moves the split there;
/// anything else stays an expense with the whole target as account path.
fn parse_target(target: &str) -> (SplitGroup, String) {
    if let Some((head, rest)) = target.split_once(':') {
        if let Some(group) = SplitGroup::parse(head) {
            return (group, rest.to_string());
        }
    }
    (SplitGroup::Expenses, target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, Split};
    use crate::utils::stable_id;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn uncategorized_entry(payee: &str, memo: Option<&str>) -> Entry {
        Entry {
            kind: EntryKind::Transaction,
            id: stable_id(payee),
            record_date: "2023-01-01".parse().unwrap(),
            payee: Some(payee.into()),
            memo: memo.map(Into::into),
            currency: "USD".into(),
            cleared: true,
            splits: vec![
                Split::new(SplitGroup::Assets, "Checking:Main", dec!(-9.99)),
                Split::new(SplitGroup::Expenses, "Uncategorized", dec!(9.99)),
            ],
            metadata: BTreeMap::new(),
        }
    }

    fn config(json: &str) -> Configuration {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn first_matching_mapping_wins() {
        let config = config(
            r#"{"mappings": [
                [{"payee": "Coffee Cart"}, "Expenses:Food:Coffee"],
                [{"memo": "latte"}, "Expenses:Food:Drinks"]
            ]}"#,
        );
        let entries = map_category(
            &config,
            vec![uncategorized_entry("Coffee Cart", Some("latte"))],
        );
        let split = &entries[0].splits[1];
        assert_eq!(split.group, SplitGroup::Expenses);
        assert_eq!(split.account, "Food:Coffee");
    }

    #[test]
    fn payee_placeholder_expands() {
        let config = config(r#"{"mappings": [[{"memo": "gift"}, "Expenses:Gifts:{payee}"]]}"#);
        let entries = map_category(&config, vec![uncategorized_entry("Aunt May", Some("gift"))]);
        assert_eq!(entries[0].splits[1].account, "Gifts:Aunt May");
    }

    #[test]
    fn mapping_can_move_split_to_income() {
        let config = config(r#"{"mappings": [[{"payee": "Refund Co"}, "Income:Refunds"]]}"#);
        let entries = map_category(&config, vec![uncategorized_entry("Refund Co", None)]);
        let split = &entries[0].splits[1];
        assert_eq!(split.group, SplitGroup::Income);
        assert_eq!(split.account, "Refunds");
    }

    #[test]
    fn categorized_splits_are_left_alone() {
        let config = config(r#"{"mappings": [[{"payee": "Grocer"}, "Expenses:Misc"]]}"#);
        let mut entry = uncategorized_entry("Grocer", None);
        entry.splits[1].account = "Food:Groceries".into();
        let entries = map_category(&config, vec![entry]);
        assert_eq!(entries[0].splits[1].account, "Food:Groceries");
    }

    #[test]
    fn group_scoped_uncategorized_bucket_is_eligible() {
        let config = config(r#"{"mappings": [[{"payee": "Grocer"}, "Expenses:Food:Misc"]]}"#);
        let mut entry = uncategorized_entry("Grocer", None);
        entry.splits[1].account = "Food:Uncategorized".into();
        let entries = map_category(&config, vec![entry]);
        assert_eq!(entries[0].splits[1].account, "Food:Misc");
    }
}
