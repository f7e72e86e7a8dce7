//! Applies the configured search/replace table to account paths.

use crate::config::Configuration;
use crate::entry::{Entry, SplitGroup};

/// Rewrites every split's full account path through the rename rules in
/// order. When a rewrite produces a path whose leading segment names a
/// different group, the split moves there; otherwise the group is kept and
/// the whole result becomes the account path.
pub fn map_accounts(config: &Configuration, mut entries: Vec<Entry>) -> Vec<Entry> {
    let rules = config.account_name_map.rules();
    if rules.is_empty() {
        return entries;
    }
    for entry in &mut entries {
        for split in &mut entry.splits {
            let original = split.name();
            let mut renamed = original.clone();
            for (search, replace) in &rules {
                renamed = renamed.replace(search, replace);
            }
            if renamed == original {
                continue;
            }
            if let Some((head, rest)) = renamed.split_once(':') {
                if let Some(group) = SplitGroup::parse(head) {
                    split.group = group;
                    split.account = rest.to_string();
                    continue;
                }
            }
            split.account = renamed;
        }
    }
    entries
}
