//! Local record store: the captured contact list, kept as a single JSON blob
//! behind a key-value port.
//!
//! Every mutation is a read-modify-write of the whole blob. Within a process
//! `&mut self` serializes them; two processes writing the same data directory
//! race and the last writer wins.

pub mod backend;
pub mod record;

use std::collections::HashSet;
use std::io;

use chrono::Utc;
use log::{debug, error, info};
use uuid::Uuid;

use crate::email_validator::EmailValidator;
use crate::error::StorageError;
use crate::extractor::{ExtractedPost, Finding, PageSnapshot};

pub use backend::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use record::ContactRecord;

pub const STORAGE_KEY: &str = "linkedin_parsed_data";

pub struct RecordStore<B: KeyValueStore> {
    backend: B,
    validator: EmailValidator,
}

impl<B: KeyValueStore> RecordStore<B> {
    pub fn new(backend: B, validator: EmailValidator) -> Self {
        RecordStore { backend, validator }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store each valid, not-yet-known address. Returns how many were added.
    pub fn save_emails<S: AsRef<str>>(
        &mut self,
        emails: &[S],
        source: &str,
        phone: Option<&str>,
    ) -> usize {
        match self.try_save_emails(emails, source, phone) {
            Ok(added) => added,
            Err(e) => {
                error!("Error saving emails: {}", e);
                0
            }
        }
    }

    fn try_save_emails<S: AsRef<str>>(
        &mut self,
        emails: &[S],
        source: &str,
        phone: Option<&str>,
    ) -> Result<usize, StorageError> {
        let cleaned = self.validator.clean_all(emails);
        let mut records = self.load()?;

        let mut known: HashSet<String> = records.iter().filter_map(|r| r.email.clone()).collect();
        let captured_at = Utc::now();
        let mut added = 0;

        for email in cleaned {
            if !known.insert(email.clone()) {
                debug!("Email already stored: {}", email);
                continue;
            }
            records.push(ContactRecord {
                id: Uuid::new_v4().to_string(),
                author_name: String::new(),
                author_title: None,
                content: None,
                email: Some(email),
                phone: phone.map(str::to_string),
                source: source.to_string(),
                captured_at,
            });
            added += 1;
        }

        if added > 0 {
            self.write(&records)?;
        }
        info!("Save completed: {} new email(s) out of {} submitted", added, emails.len());
        Ok(added)
    }

    /// Store one record per post, keyed by post id. Returns how many were added.
    pub fn save_posts(&mut self, posts: &[ExtractedPost]) -> usize {
        match self.try_save_posts(posts) {
            Ok(added) => added,
            Err(e) => {
                error!("Error saving posts: {}", e);
                0
            }
        }
    }

    fn try_save_posts(&mut self, posts: &[ExtractedPost]) -> Result<usize, StorageError> {
        let mut records = self.load()?;
        let mut known: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        let captured_at = Utc::now();
        let mut added = 0;

        for post in posts {
            if !known.insert(post.id.clone()) {
                debug!("Post already stored: {}", post.id);
                continue;
            }
            records.push(ContactRecord {
                id: post.id.clone(),
                author_name: post.author.name.clone(),
                author_title: post.author.title.clone(),
                content: Some(post.content.clone()),
                email: post.emails.first().cloned(),
                phone: post.phones.first().cloned(),
                source: format!("Post by: {}", post.author.name),
                captured_at,
            });
            added += 1;
        }

        if added > 0 {
            self.write(&records)?;
        }
        info!("Save completed: {} new post(s) out of {} submitted", added, posts.len());
        Ok(added)
    }

    /// Persist the output of a mixed analysis: posts as post records, job cards as emails
    pub fn save_findings(&mut self, findings: &[Finding]) -> usize {
        let posts: Vec<ExtractedPost> = findings
            .iter()
            .filter_map(|finding| match finding {
                Finding::Post(post) => Some(post.clone()),
                Finding::Job(_) => None,
            })
            .collect();

        let mut added = self.save_posts(&posts);

        for finding in findings {
            if let Finding::Job(job) = finding {
                let source = format!("Job: {}", job.title.as_deref().unwrap_or("Unknown"));
                added += self.save_emails(&job.emails, &source, job.phones.first().map(String::as_str));
            }
        }

        added
    }

    pub fn save_snapshot(&mut self, snapshot: &PageSnapshot) -> usize {
        let source = snapshot.title.as_deref().unwrap_or("Unknown Source");
        self.save_emails(
            &snapshot.emails,
            source,
            snapshot.phones.first().map(String::as_str),
        )
    }

    pub fn stored_emails(&self) -> Vec<ContactRecord> {
        self.load().unwrap_or_else(|e| {
            error!("Error getting stored emails: {}", e);
            Vec::new()
        })
    }

    pub fn stored_posts(&self) -> Vec<ContactRecord> {
        self.load().unwrap_or_else(|e| {
            error!("Error getting stored posts: {}", e);
            Vec::new()
        })
    }

    pub fn clear_stored_emails(&mut self) -> bool {
        match self.backend.remove(STORAGE_KEY) {
            Ok(()) => {
                info!("Stored records cleared");
                true
            }
            Err(e) => {
                error!("Error clearing stored emails: {}", e);
                false
            }
        }
    }

    /// Remove every record with this address; absent addresses are not an error
    pub fn delete_email(&mut self, email: &str) -> bool {
        let result = self.load().and_then(|mut records| {
            let before = records.len();
            records.retain(|record| record.email.as_deref() != Some(email));
            debug!("Deleting {}: {} record(s) removed", email, before - records.len());
            self.write(&records)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("Error deleting email: {}", e);
                false
            }
        }
    }

    /// Write all records as CSV, returning the number of rows
    pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<usize, StorageError> {
        let records = self.load()?;
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        info!("Exported {} record(s) to CSV", records.len());
        Ok(records.len())
    }

    fn load(&self) -> Result<Vec<ContactRecord>, StorageError> {
        match self.backend.get(STORAGE_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    fn write(&mut self, records: &[ContactRecord]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(records)?;
        self.backend.set(STORAGE_KEY, &blob)
    }
}
