//! Shared lookup and naming capability injected into both entry builders.
//!
//! Lookup misses are never errors here; they degrade to the documented
//! fallback accounts. Invalid account names are normalized with a warning
//! logged once per distinct offending name.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::entry::SplitGroup;
use crate::source::ynab::{milli_to_amount, Account, AccountType, BudgetDetail, Category, CategoryGroup};
use crate::utils::{normalize_account_name, validate_account_name, DedupLogger};

pub const UNCATEGORIZED: &str = "Uncategorized";
const TO_BE_BUDGETED: &str = "To be Budgeted";
const STARTING_BALANCE: &str = "Starting Balance";

pub struct EntryResolver<'a> {
    accounts: HashMap<&'a str, &'a Account>,
    categories: HashMap<&'a str, &'a Category>,
    category_groups: HashMap<&'a str, &'a CategoryGroup>,
    logger: DedupLogger,
}

impl<'a> EntryResolver<'a> {
    pub fn new(budget: &'a BudgetDetail, logger_scope: &'static str) -> Self {
        Self {
            accounts: budget.accounts.iter().map(|a| (a.id.as_str(), a)).collect(),
            categories: budget.categories.iter().map(|c| (c.id.as_str(), c)).collect(),
            category_groups: budget
                .category_groups
                .iter()
                .map(|g| (g.id.as_str(), g))
                .collect(),
            logger: DedupLogger::new(logger_scope),
        }
    }

    pub fn account(&self, id: &str) -> Option<&'a Account> {
        self.accounts.get(id).copied()
    }

    pub fn category(&self, id: &str) -> Option<&'a Category> {
        self.categories.get(id).copied()
    }

    /// Hidden categories resolve through their original group first; the
    /// direct group id is the last resort either way.
    pub fn category_group(&self, category: &Category) -> Option<&'a CategoryGroup> {
        if category.hidden {
            let original = category
                .original_category_group_id
                .as_deref()
                .and_then(|id| self.category_groups.get(id).copied());
            if original.is_some() {
                return original;
            }
        }
        self.category_groups
            .get(category.category_group_id.as_str())
            .copied()
    }

    pub fn account_split_group(&self, account: &Account) -> SplitGroup {
        match account.account_type {
            AccountType::CreditCard
            | AccountType::LineOfCredit
            | AccountType::Mortgage
            | AccountType::OtherLiability => SplitGroup::Liabilities,
            _ => SplitGroup::Assets,
        }
    }

    /// Maps an account through the type-to-prefix table and validates the
    /// resulting name.
    pub fn account_name(&mut self, account: &Account) -> String {
        let name = match account.account_type {
            AccountType::CreditCard | AccountType::LineOfCredit => {
                format!("Credit:{}", account.name)
            }
            AccountType::Mortgage => format!("Mortgage:{}", account.name),
            AccountType::OtherLiability
            | AccountType::OtherAsset
            | AccountType::Cash
            | AccountType::PayPal => format!("Other:{}", account.name),
            AccountType::Checking => format!("Checking:{}", account.name),
            AccountType::Savings => format!("Savings:{}", account.name),
            AccountType::InvestmentAccount | AccountType::MerchantAccount => {
                format!("Investment:{}", account.name)
            }
            _ => account.name.clone(),
        };
        self.validate_and_normalize(&name)
    }

    /// Split group for a categorized amount: "To be Budgeted" money is
    /// income, unless it is the account's starting balance, which belongs
    /// to equity.
    pub fn category_split_group(&self, payee: Option<&str>, category: &Category) -> SplitGroup {
        if category.name == TO_BE_BUDGETED {
            if payee == Some(STARTING_BALANCE) {
                SplitGroup::Equity
            } else {
                SplitGroup::Income
            }
        } else {
            SplitGroup::Expenses
        }
    }

    /// Resolves the category side of a split. Misses degrade: an id that
    /// only resolves to a category group yields that group's
    /// `Uncategorized` bucket, anything less yields the bare bucket.
    pub fn classify_category(
        &mut self,
        payee: Option<&str>,
        category_id: Option<&str>,
    ) -> (SplitGroup, String) {
        let category = category_id.and_then(|id| self.category(id));
        match category {
            Some(category) => {
                let group = self.category_split_group(payee, category);
                let name = match group {
                    SplitGroup::Income => payee.unwrap_or(UNCATEGORIZED).to_string(),
                    SplitGroup::Equity => STARTING_BALANCE.to_string(),
                    _ => match self.category_group(category) {
                        Some(category_group) => {
                            format!("{}:{}", category_group.name, category.name)
                        }
                        None => category.name.clone(),
                    },
                };
                (group, self.validate_and_normalize(&name))
            }
            None => {
                let group_bucket = category_id
                    .and_then(|id| self.category_groups.get(id).copied())
                    .map(|g| format!("{}:{}", g.name, UNCATEGORIZED));
                let name = group_bucket.unwrap_or_else(|| UNCATEGORIZED.to_string());
                (SplitGroup::Expenses, self.validate_and_normalize(&name))
            }
        }
    }

    pub fn validate_and_normalize(&mut self, name: &str) -> String {
        if validate_account_name(name) {
            return name.to_string();
        }
        let normalized = normalize_account_name(name);
        self.logger.warn_once(
            format!("ACCOUNT_NAME_NORMALIZATION_WARNING:{name}"),
            &format!("Account name '{name}' is invalid, normalizing to '{normalized}'"),
        );
        normalized
    }

    pub fn convert_amount(&self, milli: i64) -> Decimal {
        milli_to_amount(milli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> BudgetDetail {
        BudgetDetail {
            accounts: vec![
                Account {
                    id: "a-credit".into(),
                    name: "Visa".into(),
                    account_type: AccountType::CreditCard,
                    on_budget: true,
                    closed: false,
                },
                Account {
                    id: "a-check".into(),
                    name: "Main".into(),
                    account_type: AccountType::Checking,
                    on_budget: true,
                    closed: false,
                },
            ],
            category_groups: vec![
                CategoryGroup {
                    id: "g1".into(),
                    name: "Food".into(),
                    hidden: false,
                },
                CategoryGroup {
                    id: "g2".into(),
                    name: "Archived".into(),
                    hidden: true,
                },
            ],
            categories: vec![
                Category {
                    id: "c1".into(),
                    category_group_id: "g1".into(),
                    name: "Groceries".into(),
                    hidden: false,
                    original_category_group_id: None,
                    budgeted: 0,
                    goal_type: None,
                },
                Category {
                    id: "c2".into(),
                    category_group_id: "g1".into(),
                    name: "Old".into(),
                    hidden: true,
                    original_category_group_id: Some("g2".into()),
                    budgeted: 0,
                    goal_type: None,
                },
                Category {
                    id: "c3".into(),
                    category_group_id: "g1".into(),
                    name: TO_BE_BUDGETED.into(),
                    hidden: false,
                    original_category_group_id: None,
                    budgeted: 0,
                    goal_type: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn account_names_follow_the_prefix_table() {
        let budget = budget();
        let mut resolver = EntryResolver::new(&budget, "test");
        let credit = resolver.account("a-credit").unwrap();
        assert_eq!(resolver.account_name(credit), "Credit:Visa");
        let checking = resolver.account("a-check").unwrap();
        assert_eq!(resolver.account_name(checking), "Checking:Main");
    }

    #[test]
    fn liabilities_group_for_credit_accounts() {
        let budget = budget();
        let resolver = EntryResolver::new(&budget, "test");
        let credit = resolver.account("a-credit").unwrap();
        assert_eq!(resolver.account_split_group(credit), SplitGroup::Liabilities);
        let checking = resolver.account("a-check").unwrap();
        assert_eq!(resolver.account_split_group(checking), SplitGroup::Assets);
    }

    #[test]
    fn hidden_category_resolves_original_group_first() {
        let budget = budget();
        let resolver = EntryResolver::new(&budget, "test");
        let hidden = resolver.category("c2").unwrap();
        assert_eq!(resolver.category_group(hidden).unwrap().name, "Archived");
    }

    #[test]
    fn categorized_split_uses_group_and_category_names() {
        let budget = budget();
        let mut resolver = EntryResolver::new(&budget, "test");
        let (group, name) = resolver.classify_category(Some("Grocer"), Some("c1"));
        assert_eq!(group, SplitGroup::Expenses);
        assert_eq!(name, "Food:Groceries");
    }

    #[test]
    fn to_be_budgeted_splits_on_payee() {
        let budget = budget();
        let mut resolver = EntryResolver::new(&budget, "test");
        let (group, name) = resolver.classify_category(Some("Employer"), Some("c3"));
        assert_eq!((group, name.as_str()), (SplitGroup::Income, "Employer"));
        let (group, name) = resolver.classify_category(Some(STARTING_BALANCE), Some("c3"));
        assert_eq!((group, name.as_str()), (SplitGroup::Equity, STARTING_BALANCE));
    }

    #[test]
    fn missing_category_degrades_to_uncategorized() {
        let budget = budget();
        let mut resolver = EntryResolver::new(&budget, "test");
        let (group, name) = resolver.classify_category(Some("Grocer"), None);
        assert_eq!((group, name.as_str()), (SplitGroup::Expenses, UNCATEGORIZED));
        // An id that only resolves to a group lands in its bucket.
        let (_, name) = resolver.classify_category(Some("Grocer"), Some("g1"));
        assert_eq!(name, "Food:Uncategorized");
        let (_, name) = resolver.classify_category(Some("Grocer"), Some("nope"));
        assert_eq!(name, UNCATEGORIZED);
    }

    #[test]
    fn invalid_account_names_normalize() {
        let budget = budget();
        let mut resolver = EntryResolver::new(&budget, "test");
        assert_eq!(
            resolver.validate_and_normalize("Food (snacks)  daily"),
            "Food snacks daily"
        );
    }
}
