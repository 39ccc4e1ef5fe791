// Library exports for linkscrape crate
// This allows tests and the binary to use the modules

pub mod config;
pub mod email_validator;
pub mod error;
pub mod extractor;
pub mod mailer;
pub mod server;
pub mod store;

pub use email_validator::{EmailValidator, ValidatedEmail};
pub use error::{ExtractError, MailerError, StorageError};
pub use extractor::ContentExtractor;
pub use mailer::{BatchResult, BulkMailer};
pub use store::{ContactRecord, RecordStore};
