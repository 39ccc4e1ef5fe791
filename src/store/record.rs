use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured contact, as persisted and as sent to the mailer endpoint.
///
/// `capturedAt` travels as epoch milliseconds. Missing fields are tolerated
/// on input so hand-built request bodies still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub captured_at: DateTime<Utc>,
}

impl ContactRecord {
    /// First word of the author name, if there is one
    pub fn first_name(&self) -> Option<&str> {
        self.author_name.split_whitespace().next()
    }
}
