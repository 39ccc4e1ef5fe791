//! Error types shared by the extraction, storage and mailing layers

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning an HTML snapshot into records
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Nothing to analyze
    #[error("Empty HTML input: paste the page source before analyzing")]
    EmptyInput,

    /// A built-in CSS selector failed to compile
    #[error("Invalid selector '{selector}': {details}")]
    InvalidSelector { selector: String, details: String },

    /// A built-in pattern failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised by a key-value backend or while (de)serializing the record blob
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unable to persist key '{key}': {details}")]
    Persist { key: String, details: String },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the bulk mailer
///
/// Only setup failures escape `send_bulk`; per-recipient failures are
/// recorded in the batch result instead.
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Unable to read attachment {path:?}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid email address '{0}'")]
    InvalidAddress(String),

    #[error("Unable to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),

    #[error("Invalid request body: {0}")]
    Request(#[from] serde_json::Error),
}
