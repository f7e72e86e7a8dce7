use thiserror::Error;

use crate::entry::EntryKind;

/// Error type that captures export failures.
///
/// Lookup misses inside the builders are not errors; they degrade to
/// documented fallback accounts. Anything surfaced here indicates a
/// systemic misconfiguration and terminates the run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid filter expression: {0}")]
    Filter(String),
    #[error("Cannot render {kind:?} entry as {output} output")]
    UnsupportedOutput { kind: EntryKind, output: String },
    #[error("Source data error: {0}")]
    Source(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
