//! Builds virtual budget records from the monthly goal snapshots.
//!
//! Each month with goal-backed budgeted amounts yields one dated entry
//! moving money from a budget liability into per-category budget assets.
//! Every distinct goal category additionally yields one undated automatic
//! entry whose matcher lets downstream tooling route real spending against
//! the budgeted asset.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use std::collections::BTreeMap;

use crate::entry::{split_sort, Entry, EntryKind, Split, SplitGroup, META_ACCOUNT_MATCHER};
use crate::source::ynab::resolver::EntryResolver;
use crate::source::ynab::{milli_to_amount, BudgetDetail, Category};
use crate::utils::stable_id;

const CURRENCY: &str = "USD";
const BUDGET_PAYEE: &str = "Budget";
const BUDGET_LIABILITY: &str = "Budget";

pub struct BudgetEntryBuilder<'a> {
    budget: &'a BudgetDetail,
    resolver: EntryResolver<'a>,
}

impl<'a> BudgetEntryBuilder<'a> {
    pub fn new(budget: &'a BudgetDetail, resolver: EntryResolver<'a>) -> Self {
        Self { budget, resolver }
    }

    /// One dated entry per month with goals, followed by one automatic
    /// entry per distinct goal category.
    pub fn build(&mut self) -> Vec<Entry> {
        let mut entries = Vec::new();
        // BTreeMap keys double as the distinct-category set, ordered by name.
        let mut goal_names: BTreeMap<String, ()> = BTreeMap::new();

        let budget = self.budget;
        for month in &budget.months {
            let goals = month.goal_categories();
            if goals.is_empty() {
                continue;
            }
            for category in &goals {
                goal_names.insert(self.category_name(category), ());
            }
            entries.push(self.month_entry(month.month, month.note.clone(), &goals));
        }

        for name in goal_names.keys() {
            entries.push(self.automatic_entry(name));
        }
        entries
    }

    fn category_name(&mut self, category: &Category) -> String {
        let name = match self.resolver.category_group(category) {
            Some(group) => format!("{}:{}", group.name, category.name),
            None => category.name.clone(),
        };
        self.resolver.validate_and_normalize(&name)
    }

    fn month_entry(
        &mut self,
        month: NaiveDate,
        note: Option<String>,
        goals: &[&Category],
    ) -> Entry {
        let total: i64 = goals.iter().map(|c| c.budgeted).sum();
        let mut splits = vec![Split::new(
            SplitGroup::Liabilities,
            BUDGET_LIABILITY,
            milli_to_amount(-total),
        )];
        for category in goals {
            let name = self.category_name(category);
            splits.push(Split::new(
                SplitGroup::Assets,
                format!("Budget:{name}"),
                milli_to_amount(category.budgeted),
            ));
        }
        splits.sort_by(split_sort);
        Entry {
            kind: EntryKind::Budget,
            id: stable_id(&month.to_string()),
            record_date: month,
            payee: Some(BUDGET_PAYEE.to_string()),
            memo: note,
            currency: CURRENCY.to_string(),
            cleared: true,
            splits,
            metadata: BTreeMap::new(),
        }
    }

    /// An epoch-dated placeholder carrying the expense matcher for one
    /// budgeted category. Its id derives from the matcher, so the same
    /// category never yields two placeholders across months.
    fn automatic_entry(&mut self, name: &str) -> Entry {
        let matcher = format!("/Expenses:{name}/");
        let mut metadata = BTreeMap::new();
        metadata.insert(META_ACCOUNT_MATCHER.to_string(), Some(matcher.clone()));
        // Two-decimal scale so the fixed pair renders as 1.00/-1.00.
        let one = Decimal::new(100, 2);
        let mut splits = vec![
            Split::new(SplitGroup::Liabilities, BUDGET_LIABILITY, one),
            Split::new(SplitGroup::Assets, format!("Budget:{name}"), -one),
        ];
        splits.sort_by(split_sort);
        Entry {
            kind: EntryKind::Budget,
            id: stable_id(&matcher),
            record_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            payee: Some(BUDGET_PAYEE.to_string()),
            memo: None,
            currency: CURRENCY.to_string(),
            cleared: true,
            splits,
            metadata,
        }
    }
}
