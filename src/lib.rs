#![doc(test(attr(deny(warnings))))]

//! Converts a YNAB-style budget export into balanced double-entry ledger
//! entries and runs them through an ordered chain of normalization passes
//! (category mapping, account renaming, filtering, transfer deduplication,
//! starting-balance and payroll consolidation).

pub mod config;
pub mod entry;
pub mod errors;
pub mod filter;
pub mod source;
pub mod transform;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("ynab_export tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
