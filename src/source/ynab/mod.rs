//! Inbound data contract for a YNAB budget export and its denormalization
//! into self-contained transaction records.
//!
//! Amounts arrive as milliunit integers; [`milli_to_amount`] converts them
//! to decimal currency units (2 places, midpoint away from zero).

pub mod budget_builder;
pub mod provider;
pub mod resolver;
pub mod transaction_builder;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::utils::find_by_id;

/// Converts a minor-unit (milliunit) integer to decimal currency units.
pub fn milli_to_amount(milli: i64) -> Decimal {
    Decimal::new(milli, 3).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
    Checking,
    Savings,
    Cash,
    CreditCard,
    LineOfCredit,
    OtherAsset,
    OtherLiability,
    Mortgage,
    AutoLoan,
    StudentLoan,
    PersonalLoan,
    PayPal,
    MerchantAccount,
    InvestmentAccount,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub on_budget: bool,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub category_group_id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub original_category_group_id: Option<String>,
    /// Budgeted milliunits for the month this category instance belongs to.
    #[serde(default)]
    pub budgeted: i64,
    #[serde(default)]
    pub goal_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub month: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl MonthSnapshot {
    /// Categories with a goal and a non-zero budgeted amount drive the
    /// month's budget entry.
    pub fn goal_categories(&self) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| c.goal_type.is_some() && c.budgeted != 0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClearedStatus {
    Cleared,
    Uncleared,
    Reconciled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTransaction {
    pub id: String,
    pub transaction_id: String,
    pub amount: i64,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub transfer_account_id: Option<String>,
}

/// A raw transaction row as exported; names and sub-transactions live in
/// sibling arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(default)]
    pub memo: Option<String>,
    pub cleared: ClearedStatus,
    pub account_id: String,
    #[serde(default)]
    pub payee_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub transfer_transaction_id: Option<String>,
}

/// A transaction with denormalized names and attached sub-transactions,
/// the shape the builders consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    #[serde(default)]
    pub memo: Option<String>,
    pub cleared: ClearedStatus,
    pub account_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub transfer_transaction_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub payee_name: Option<String>,
    #[serde(default)]
    pub subtransactions: Vec<SubTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BudgetDetail {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub payees: Vec<Payee>,
    #[serde(default)]
    pub category_groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub months: Vec<MonthSnapshot>,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    #[serde(default)]
    pub subtransactions: Vec<SubTransaction>,
}

impl BudgetDetail {
    /// Resolves denormalized names and attaches each transaction's
    /// sub-transactions.
    pub fn transaction_details(&self) -> Vec<TransactionDetail> {
        self.transactions
            .iter()
            .map(|t| TransactionDetail {
                id: t.id.clone(),
                date: t.date,
                amount: t.amount,
                memo: t.memo.clone(),
                cleared: t.cleared,
                account_id: t.account_id.clone(),
                category_id: t.category_id.clone(),
                transfer_account_id: t.transfer_account_id.clone(),
                transfer_transaction_id: t.transfer_transaction_id.clone(),
                account_name: find_by_id(&self.accounts, |a| &a.id, &t.account_id)
                    .map(|a| a.name.clone()),
                category_name: t.category_id.as_ref().and_then(|id| {
                    find_by_id(&self.categories, |c| &c.id, id).map(|c| c.name.clone())
                }),
                payee_name: t.payee_id.as_ref().and_then(|id| {
                    find_by_id(&self.payees, |p| &p.id, id).map(|p| p.name.clone())
                }),
                subtransactions: self
                    .subtransactions
                    .iter()
                    .filter(|st| st.transaction_id == t.id)
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
