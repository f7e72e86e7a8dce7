//! Entry point turning a budget export into transformed entries.

use std::path::Path;

use tracing::debug;

use crate::config::Configuration;
use crate::entry::{entry_sort, Entry, META_SOURCE_ID, META_TRANSFER_ID};
use crate::errors::ExportError;
use crate::source::ynab::budget_builder::BudgetEntryBuilder;
use crate::source::ynab::resolver::EntryResolver;
use crate::source::ynab::transaction_builder::TransactionEntryBuilder;
use crate::source::ynab::BudgetDetail;
use crate::transform;
use crate::utils::unique_by;

#[derive(Debug, Clone, Copy)]
pub struct ProviderOptions {
    /// Emit virtual budget entries alongside transactions.
    pub budget: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self { budget: true }
    }
}

pub struct YnabProvider {
    budget: BudgetDetail,
}

impl YnabProvider {
    pub fn new(budget: BudgetDetail) -> Self {
        Self { budget }
    }

    /// Loads a budget export from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let raw = std::fs::read_to_string(path)?;
        let budget: BudgetDetail = serde_json::from_str(&raw)?;
        Ok(Self::new(budget))
    }

    /// Builds raw entries: transactions first (one survivor per transfer
    /// pair), then budget entries, deduplicated by id and date-sorted.
    pub fn get_entries(&self, options: ProviderOptions) -> Vec<Entry> {
        let mut builder =
            TransactionEntryBuilder::new(EntryResolver::new(&self.budget, "TransactionEntryBuilder"));
        let mut entries: Vec<Entry> = self
            .budget
            .transaction_details()
            .iter()
            .map(|txn| builder.build(txn))
            .filter(keep_transfer_side)
            .collect();
        debug!(count = entries.len(), "built transaction entries");

        if options.budget {
            let resolver = EntryResolver::new(&self.budget, "BudgetEntryBuilder");
            let budget_entries = BudgetEntryBuilder::new(&self.budget, resolver).build();
            debug!(count = budget_entries.len(), "built budget entries");
            entries.extend(budget_entries);
        }

        let mut entries = unique_by(entries, |e| e.id);
        entries.sort_by(entry_sort);
        entries
    }

    /// Raw entries run through the full transformation pipeline.
    pub fn export_entries(
        &self,
        config: &Configuration,
        options: ProviderOptions,
    ) -> Result<Vec<Entry>, ExportError> {
        transform::apply(config, self.get_entries(options))
    }
}

/// Keeps exactly one side of each transfer pair at build time: the side
/// whose own source id orders below its counterpart's. Counterparts of
/// sub-transaction transfers carry no id of their own and are dropped;
/// the sub-transaction side already holds both splits.
fn keep_transfer_side(entry: &Entry) -> bool {
    if !entry.has_metadata(META_TRANSFER_ID) {
        return true;
    }
    match (
        entry.metadata_value(META_SOURCE_ID),
        entry.metadata_value(META_TRANSFER_ID),
    ) {
        (Some(own), Some(counterpart)) => own < counterpart,
        _ => false,
    }
}
