//! Maps one source transaction into one balanced double-entry record.
//!
//! A transaction takes exactly one of three shapes: transfer (a counterpart
//! account is referenced), standard (one category side), or split (one
//! sub-line-item per category/transfer). The opposite side of a transfer is
//! produced independently from that side's own record; pruning the
//! resulting pair is the pipeline's job, not the builder's.

use std::collections::BTreeMap;

use crate::entry::{
    split_sort, Entry, EntryKind, Split, SplitGroup, META_SOURCE_ID, META_TRANSFER_ID,
};
use crate::source::ynab::resolver::EntryResolver;
use crate::source::ynab::{ClearedStatus, SubTransaction, TransactionDetail};
use crate::utils::stable_id;

const CURRENCY: &str = "USD";

pub struct TransactionEntryBuilder<'a> {
    resolver: EntryResolver<'a>,
}

impl<'a> TransactionEntryBuilder<'a> {
    pub fn new(resolver: EntryResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn build(&mut self, transaction: &TransactionDetail) -> Entry {
        let mut entry = if transaction.transfer_account_id.is_some() {
            self.build_transfer_entry(transaction)
        } else if transaction.subtransactions.is_empty() {
            self.build_standard_entry(transaction)
        } else {
            self.build_split_entry(transaction)
        };
        entry.splits.sort_by(split_sort);
        entry
    }

    fn base_entry(&self, transaction: &TransactionDetail) -> Entry {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_SOURCE_ID.to_string(), Some(transaction.id.clone()));
        Entry {
            kind: EntryKind::Transaction,
            id: stable_id(&transaction.id),
            record_date: transaction.date,
            payee: transaction.payee_name.clone(),
            memo: transaction.memo.clone(),
            currency: CURRENCY.to_string(),
            cleared: transaction.cleared != ClearedStatus::Uncleared,
            splits: Vec::new(),
            metadata,
        }
    }

    fn build_transfer_entry(&mut self, transaction: &TransactionDetail) -> Entry {
        let mut entry = self.base_entry(transaction);
        entry.metadata.insert(
            META_TRANSFER_ID.to_string(),
            transaction.transfer_transaction_id.clone(),
        );

        let amount = self.resolver.convert_amount(transaction.amount);
        let category = transaction
            .category_id
            .as_deref()
            .and_then(|id| self.resolver.category(id));

        if category.is_some() {
            // Off-budget side of an on/off-budget transfer: the category
            // carries the other half, exactly like a standard entry.
            let (group, account) = self
                .resolver
                .classify_category(transaction.payee_name.as_deref(), transaction.category_id.as_deref());
            entry.splits = vec![
                self.account_split(transaction),
                Split::new(group, account, -amount),
            ];
        } else {
            let transfer_account_id = transaction
                .transfer_account_id
                .as_deref()
                .unwrap_or_default();
            let counterpart = match self.resolver.account(transfer_account_id) {
                Some(account) => {
                    let group = self.resolver.account_split_group(account);
                    let name = self.resolver.account_name(account);
                    Split::new(group, name, -amount)
                }
                None => Split::new(
                    SplitGroup::Assets,
                    self.resolver.validate_and_normalize("Unknown Account"),
                    -amount,
                ),
            };
            entry.payee = Some("Transfer".to_string());
            entry.splits = vec![self.account_split(transaction), counterpart];
        }
        entry
    }

    fn build_standard_entry(&mut self, transaction: &TransactionDetail) -> Entry {
        let mut entry = self.base_entry(transaction);
        let amount = self.resolver.convert_amount(transaction.amount);
        let (group, account) = self.resolver.classify_category(
            transaction.payee_name.as_deref(),
            transaction.category_id.as_deref(),
        );
        entry.splits = vec![
            self.account_split(transaction),
            Split::new(group, account, -amount),
        ];
        entry
    }

    fn build_split_entry(&mut self, transaction: &TransactionDetail) -> Entry {
        let mut entry = self.base_entry(transaction);
        entry.splits.push(self.account_split(transaction));
        for sub in &transaction.subtransactions {
            entry.splits.push(self.sub_split(transaction, sub));
        }
        entry
    }

    /// Each sub-line-item classifies independently as transfer or
    /// categorized, negated against the account split.
    fn sub_split(&mut self, transaction: &TransactionDetail, sub: &SubTransaction) -> Split {
        let amount = self.resolver.convert_amount(sub.amount);
        if let Some(transfer_account_id) = sub.transfer_account_id.as_deref() {
            return match self.resolver.account(transfer_account_id) {
                Some(account) => {
                    let group = self.resolver.account_split_group(account);
                    let name = self.resolver.account_name(account);
                    Split::new(group, name, -amount)
                }
                None => Split::new(
                    SplitGroup::Assets,
                    self.resolver.validate_and_normalize("Unknown Account"),
                    -amount,
                ),
            };
        }
        let (group, account) = self
            .resolver
            .classify_category(transaction.payee_name.as_deref(), sub.category_id.as_deref());
        let mut split = Split::new(group, account, -amount);
        split.memo = sub.memo.clone();
        split
    }

    fn account_split(&mut self, transaction: &TransactionDetail) -> Split {
        let amount = self.resolver.convert_amount(transaction.amount);
        match self.resolver.account(&transaction.account_id) {
            Some(account) => {
                let group = self.resolver.account_split_group(account);
                let name = self.resolver.account_name(account);
                Split::new(group, name, amount)
            }
            None => {
                let fallback = transaction
                    .account_name
                    .clone()
                    .unwrap_or_else(|| "Unknown Account".to_string());
                Split::new(
                    SplitGroup::Assets,
                    self.resolver.validate_and_normalize(&fallback),
                    amount,
                )
            }
        }
    }
}
