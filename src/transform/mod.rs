//! Transformation pipeline: an ordered sequence of passes, each taking the
//! previous pass's entries by value and returning the next set.
//!
//! Ordering matters: category mapping runs before account mapping because
//! it keys on the canonical `Uncategorized` accounts; transfer cleanup runs
//! before reclassification; both run before the consolidation passes, which
//! assume a deduplicated entry set.

pub mod cleanup_transfers;
pub mod combine;
pub mod filter_entries;
pub mod map_accounts;
pub mod map_category;
pub mod rta;

use tracing::debug;

use crate::config::Configuration;
use crate::entry::Entry;
use crate::errors::ExportError;

/// Runs the full pipeline. Configuration problems (malformed filter,
/// colliding account map) abort before the first pass touches an entry.
pub fn apply(config: &Configuration, entries: Vec<Entry>) -> Result<Vec<Entry>, ExportError> {
    config.validate()?;
    let filter = config.resolve_filter()?;

    let entries = run("map_category", entries, |e| map_category::map_category(config, e));
    let entries = run("map_accounts", entries, |e| map_accounts::map_accounts(config, e));
    let entries = run("filter_entries", entries, |e| {
        filter_entries::filter_entries(config, filter.as_ref(), e)
    });
    let entries = run("cleanup_transfers", entries, cleanup_transfers::cleanup_transfers);
    let entries = run("rta_to_income", entries, rta::rta_to_income);
    let entries = run("combine_starting_balance", entries, combine::combine_starting_balance);
    let entries = run("combine_payroll", entries, combine::combine_payroll);
    Ok(entries)
}

fn run<F>(pass: &str, entries: Vec<Entry>, f: F) -> Vec<Entry>
where
    F: FnOnce(Vec<Entry>) -> Vec<Entry>,
{
    let before = entries.len();
    let entries = f(entries);
    debug!(pass, before, after = entries.len(), "pipeline pass");
    entries
}
