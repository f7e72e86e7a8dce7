//! Prunes transfer counterparts so each reciprocal pair keeps one entry.

use std::collections::HashSet;

use crate::entry::{Entry, META_SOURCE_ID, META_TRANSFER_ID};

/// Walks the entries in order. The first side of a pair seen survives and
/// marks its counterpart's source id for pruning; the counterpart is then
/// dropped when reached. Entries whose transfer link is explicitly null
/// are counterparts of sub-line-items and are always dropped. Running the
/// pass again over its own output changes nothing.
pub fn cleanup_transfers(entries: Vec<Entry>) -> Vec<Entry> {
    let mut pruned: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.has_metadata(META_TRANSFER_ID) {
            kept.push(entry);
            continue;
        }
        let Some(counterpart) = entry.metadata_value(META_TRANSFER_ID) else {
            continue;
        };
        let own = entry.metadata_value(META_SOURCE_ID);
        if own.is_some_and(|id| pruned.contains(id)) {
            continue;
        }
        pruned.insert(counterpart.to_string());
        kept.push(entry);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, Split, SplitGroup};
    use crate::utils::stable_id;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn transfer(own: &str, counterpart: Option<&str>) -> Entry {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_SOURCE_ID.to_string(), Some(own.to_string()));
        metadata.insert(
            META_TRANSFER_ID.to_string(),
            counterpart.map(ToString::to_string),
        );
        Entry {
            kind: EntryKind::Transaction,
            id: stable_id(own),
            record_date: "2023-01-01".parse().unwrap(),
            payee: Some("Transfer".into()),
            memo: None,
            currency: "USD".into(),
            cleared: true,
            splits: vec![
                Split::new(SplitGroup::Assets, "Checking:Main", dec!(-50.00)),
                Split::new(SplitGroup::Assets, "Savings:Stash", dec!(50.00)),
            ],
            metadata,
        }
    }

    fn plain(own: &str) -> Entry {
        let mut entry = transfer(own, None);
        entry.metadata.remove(META_TRANSFER_ID);
        entry
    }

    #[test]
    fn one_side_of_each_pair_survives() {
        let entries = cleanup_transfers(vec![
            transfer("t-a", Some("t-b")),
            transfer("t-b", Some("t-a")),
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata_value(META_SOURCE_ID), Some("t-a"));
    }

    #[test]
    fn null_transfer_links_are_dropped() {
        let entries = cleanup_transfers(vec![transfer("t-half", None), plain("t-plain")]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata_value(META_SOURCE_ID), Some("t-plain"));
    }

    #[test]
    fn pass_is_idempotent() {
        let once = cleanup_transfers(vec![
            transfer("t-a", Some("t-b")),
            transfer("t-b", Some("t-a")),
            plain("t-c"),
        ]);
        let twice = cleanup_transfers(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn independent_pairs_each_keep_one() {
        let entries = cleanup_transfers(vec![
            transfer("t-a", Some("t-b")),
            transfer("t-c", Some("t-d")),
            transfer("t-b", Some("t-a")),
            transfer("t-d", Some("t-c")),
        ]);
        assert_eq!(entries.len(), 2);
    }
}
