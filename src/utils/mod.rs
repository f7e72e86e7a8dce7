//! Tracing setup, stable-identity helpers, and account-name hygiene shared
//! by the builders and transformation passes.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::sync::Once;

use uuid::Uuid;

static TRACING_INIT: Once = Once::new();

/// Namespace for deterministic v5 entry ids; re-runs over the same source
/// data must produce identical ids so re-exports stay idempotent.
pub const UUID_NAMESPACE: Uuid = Uuid::from_u128(0x52670371_647b_4ffc_a0fa_f9faefc4b121);

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("ynab_export=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Derives a stable entry id from a source record's natural key.
pub fn stable_id(key: &str) -> Uuid {
    Uuid::new_v5(&UUID_NAMESPACE, key.as_bytes())
}

/// Finds the element whose extracted id equals `id`.
pub fn find_by_id<'a, T, K>(items: &'a [T], id_of: impl Fn(&T) -> &K, id: &K) -> Option<&'a T>
where
    K: PartialEq + ?Sized,
{
    items.iter().find(|item| id_of(item) == id)
}

/// Keeps the first occurrence of each key, preserving input order.
pub fn unique_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// Groups items by key, preserving input order within each group.
pub fn group_by<T, K, F>(items: Vec<T>, key: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

const FORBIDDEN_CHARS: &[char] = &['(', ')', '[', ']', '#', ';', '%', '*', '|'];

/// Returns false when the name contains doubled whitespace, a non-space
/// whitespace character, or one of `()[]#;%*|`.
pub fn validate_account_name(name: &str) -> bool {
    let mut prev_ws = false;
    for ch in name.chars() {
        if FORBIDDEN_CHARS.contains(&ch) {
            return false;
        }
        if ch.is_whitespace() && ch != ' ' {
            return false;
        }
        let ws = ch == ' ';
        if ws && prev_ws {
            return false;
        }
        prev_ws = ws;
    }
    true
}

/// Collapses whitespace runs to a single space and strips illegal
/// characters. Normalizing an already-valid name returns it unchanged.
pub fn normalize_account_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_ws = false;
    for ch in name.chars() {
        if FORBIDDEN_CHARS.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            if !prev_ws {
                out.push(' ');
            }
            prev_ws = true;
        } else {
            out.push(ch);
            prev_ws = false;
        }
    }
    out.trim().to_string()
}

/// Warning logger that emits each message key at most once.
///
/// Owned by one resolver scope rather than held globally, so a fresh run
/// starts with a clean slate.
pub struct DedupLogger {
    scope: &'static str,
    seen: HashSet<String>,
}

impl DedupLogger {
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            seen: HashSet::new(),
        }
    }

    pub fn warn_once(&mut self, key: impl Into<String>, message: &str) {
        if self.seen.insert(key.into()) {
            tracing::warn!(scope = self.scope, "{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_by_keeps_first_occurrence() {
        let items = vec![(1, "a"), (2, "b"), (1, "c")];
        let unique = unique_by(items, |item| item.0);
        assert_eq!(unique, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn group_by_preserves_order_within_groups() {
        let groups = group_by(vec![1, 2, 3, 4, 5], |n| n % 2);
        assert_eq!(groups[&0], vec![2, 4]);
        assert_eq!(groups[&1], vec![1, 3, 5]);
    }

    #[test]
    fn validate_rejects_forbidden_characters_and_doubled_spaces() {
        assert!(validate_account_name("Checking:Main"));
        assert!(!validate_account_name("Checking (old)"));
        assert!(!validate_account_name("Double  Space"));
        assert!(!validate_account_name("Tab\there"));
    }

    #[test]
    fn normalize_is_idempotent() {
        let messy = "Food * [misc]   stuff";
        let once = normalize_account_name(messy);
        assert_eq!(once, "Food misc stuff");
        assert_eq!(normalize_account_name(&once), once);
    }

    #[test]
    fn normalize_leaves_valid_names_unchanged() {
        assert_eq!(normalize_account_name("Checking:Main"), "Checking:Main");
    }

    #[test]
    fn stable_id_is_deterministic() {
        assert_eq!(stable_id("txn-1"), stable_id("txn-1"));
        assert_ne!(stable_id("txn-1"), stable_id("txn-2"));
    }

    #[test]
    fn dedup_logger_tracks_keys() {
        let mut logger = DedupLogger::new("test");
        assert!(logger.seen.insert("other".into()));
        logger.warn_once("k", "first");
        logger.warn_once("k", "second");
        assert_eq!(logger.seen.len(), 2);
    }
}
