//! Reclassifies internal to-be-budgeted splits by payee pattern.
//!
//! Inflow transactions land in the source's internal master category; the
//! payee tells us what the money actually was. An ordered rule table maps
//! recognized payee patterns to an income or equity account, first match
//! wins, and the rewrite applies to every split still pointing at the
//! internal category.

use once_cell::sync::Lazy;

use crate::entry::{Entry, SplitGroup};

const INTERNAL_CATEGORY: &str = "Internal Master Category";

struct ReclassRule {
    applies: fn(&str) -> bool,
    target: fn(&Entry) -> (SplitGroup, String),
}

static RULES: Lazy<Vec<ReclassRule>> = Lazy::new(|| {
    vec![
        ReclassRule {
            applies: |payee| payee == "Starting Balance",
            target: |_| (SplitGroup::Equity, "Starting Balance".to_string()),
        },
        ReclassRule {
            applies: |payee| payee.contains("Dividend"),
            target: |_| (SplitGroup::Income, "Dividends".to_string()),
        },
        ReclassRule {
            applies: |payee| payee.contains("Interest"),
            target: |_| (SplitGroup::Income, "Interest".to_string()),
        },
        ReclassRule {
            applies: |payee| payee.contains("Payroll"),
            target: |entry| {
                let benefits = entry.splits.iter().any(|s| s.account.contains("Benefits"));
                let account = if benefits { "Payroll:Benefits" } else { "Payroll" };
                (SplitGroup::Income, account.to_string())
            },
        },
    ]
});

pub fn rta_to_income(mut entries: Vec<Entry>) -> Vec<Entry> {
    for entry in &mut entries {
        let Some(payee) = entry.payee.clone() else {
            continue;
        };
        let Some(rule) = RULES.iter().find(|r| (r.applies)(&payee)) else {
            continue;
        };
        let (group, account) = (rule.target)(entry);
        for split in &mut entry.splits {
            if split.account.contains(INTERNAL_CATEGORY) {
                split.group = group;
                split.account = account.clone();
            }
        }
    }
    entries
}
