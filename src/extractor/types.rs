//! Records produced by one extraction call. None of these are persisted as-is;
//! the store maps them into `ContactRecord`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub title: Option<String>,
    /// 2 or 3 when the page shows a "2nd"/"3rd" badge
    pub connection_degree: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionBreakdown {
    pub like: u32,
    pub celebrate: u32,
    pub support: u32,
    pub love: u32,
    pub insightful: u32,
    pub curious: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    pub count: u64,
    pub types: ReactionBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    pub id: String,
    pub author: Author,
    pub content: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPost {
    pub id: String,
    pub author: Author,
    pub content: String,
    pub timestamp: Option<String>,
    pub reactions: Reactions,
    pub comments: Vec<PostComment>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub posted_date: Option<String>,
}

/// One result of the mixed analysis: job cards and feed posts from the same page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Finding {
    Post(ExtractedPost),
    Job(JobListing),
}

/// Whole-page scan of a profile or job page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub title: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}
