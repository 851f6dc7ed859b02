//! Store failure taxonomy. Every backend fault maps onto one of these
//! variants so callers can print a human-readable message and move on;
//! the store itself never retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record data: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("network error talking to the record table: {0}")]
    Network(#[from] reqwest::Error),

    /// The table answered with a non-success status (missing table,
    /// rejected write, bad credentials).
    #[error("record table rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid store configuration: {0}")]
    Config(String),
}
