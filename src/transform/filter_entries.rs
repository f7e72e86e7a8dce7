//! Drops entries failing the configured predicate or the start-date cutoff.

use crate::config::Configuration;
use crate::entry::{Entry, META_ACCOUNT_MATCHER};
use crate::filter::Filter;

/// The start date lower-bounds record dates inclusively. Only the automatic
/// budget placeholders are exempt; they are account-existence anchors, not
/// dated activity, and carry the matcher metadata key. The predicate, when
/// configured, applies to every entry.
pub fn filter_entries(
    config: &Configuration,
    filter: Option<&Filter>,
    entries: Vec<Entry>,
) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| {
            if let Some(start) = config.start_date {
                if entry.record_date < start && !entry.has_metadata(META_ACCOUNT_MATCHER) {
                    return false;
                }
            }
            filter.map_or(true, |f| f.matches(entry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, Split, SplitGroup};
    use crate::utils::stable_id;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entry(kind: EntryKind, date: &str, payee: &str) -> Entry {
        Entry {
            kind,
            id: stable_id(&format!("{date}-{payee}")),
            record_date: date.parse().unwrap(),
            payee: Some(payee.into()),
            memo: None,
            currency: "USD".into(),
            cleared: true,
            splits: vec![
                Split::new(SplitGroup::Assets, "Checking:Main", dec!(-1.00)),
                Split::new(SplitGroup::Expenses, "Misc", dec!(1.00)),
            ],
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn start_date_cuts_transactions_inclusively() {
        let config: Configuration =
            serde_json::from_str(r#"{"start_date": "2023-02-01"}"#).unwrap();
        let entries = filter_entries(
            &config,
            None,
            vec![
                entry(EntryKind::Transaction, "2023-01-31", "early"),
                entry(EntryKind::Transaction, "2023-02-01", "on-time"),
            ],
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payee.as_deref(), Some("on-time"));
    }

    #[test]
    fn automatic_placeholder_entries_survive_the_cutoff() {
        let config: Configuration =
            serde_json::from_str(r#"{"start_date": "2023-02-01"}"#).unwrap();
        let mut placeholder = entry(EntryKind::Budget, "1970-01-01", "Budget");
        placeholder.metadata.insert(
            META_ACCOUNT_MATCHER.to_string(),
            Some("/Expenses:Monthly:Rent/".to_string()),
        );
        let entries = filter_entries(&config, None, vec![placeholder]);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn dated_budget_snapshots_obey_the_cutoff() {
        let config: Configuration =
            serde_json::from_str(r#"{"start_date": "2023-01-01"}"#).unwrap();
        let entries = filter_entries(
            &config,
            None,
            vec![
                entry(EntryKind::Budget, "2022-06-01", "Budget"),
                entry(EntryKind::Budget, "2023-03-01", "Budget"),
            ],
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record_date.to_string(), "2023-03-01");
    }

    #[test]
    fn predicate_drops_non_matching_entries() {
        let filter = Filter::parse(&json!({"==": ["payee", "keep"]})).unwrap();
        let entries = filter_entries(
            &Configuration::default(),
            Some(&filter),
            vec![
                entry(EntryKind::Transaction, "2023-01-01", "keep"),
                entry(EntryKind::Transaction, "2023-01-01", "drop"),
            ],
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payee.as_deref(), Some("keep"));
    }

    #[test]
    fn no_configuration_keeps_everything() {
        let entries = filter_entries(
            &Configuration::default(),
            None,
            vec![entry(EntryKind::Transaction, "2023-01-01", "any")],
        );
        assert_eq!(entries.len(), 1);
    }
}
