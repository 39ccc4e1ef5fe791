//! Content extraction from saved LinkedIn page source.
//!
//! Everything here works on markup the user already has: the document is
//! parsed, stripped of anything that could load remote resources, and then
//! queried with fixed selectors. No request is ever made.

mod contacts;
mod jobs;
mod page;
mod posts;
mod sanitize;
mod selectors;
pub mod types;

use chrono::Utc;
use log::{debug, info};
use scraper::{ElementRef, Html, Selector};

use crate::email_validator::EmailValidator;
use crate::error::ExtractError;
use contacts::ContactPatterns;
use selectors::Selectors;

pub use types::{
    Author, ExtractedPost, Finding, JobListing, PageSnapshot, PostComment, ReactionBreakdown,
    Reactions,
};

pub struct ContentExtractor {
    selectors: Selectors,
    contacts: ContactPatterns,
}

impl ContentExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_validator(EmailValidator::new()?)
    }

    pub fn with_validator(validator: EmailValidator) -> Result<Self, ExtractError> {
        Ok(ContentExtractor {
            selectors: Selectors::new()?,
            contacts: ContactPatterns::new(validator)?,
        })
    }

    pub fn validator(&self) -> &EmailValidator {
        self.contacts.validator()
    }

    /// Parse and sanitize, returning the cleaned markup
    pub fn sanitize(&self, html: &str) -> Result<String, ExtractError> {
        Ok(self.parse(html)?.html())
    }

    /// Extract every feed post found in the document
    pub fn analyze(&self, html: &str) -> Result<Vec<ExtractedPost>, ExtractError> {
        let document = self.parse(html)?;
        let posts: Vec<ExtractedPost> = document
            .select(&self.selectors.post_container)
            .map(|container| self.extract_post(container))
            .collect();

        info!("Extracted {} post(s)", posts.len());
        Ok(posts)
    }

    /// Extract every job card found in the document
    pub fn analyze_jobs(&self, html: &str) -> Result<Vec<JobListing>, ExtractError> {
        let document = self.parse(html)?;
        let jobs: Vec<JobListing> = document
            .select(&self.selectors.job_container)
            .map(|container| self.extract_job(container))
            .collect();

        info!("Extracted {} job listing(s)", jobs.len());
        Ok(jobs)
    }

    /// Job cards first, then feed posts
    pub fn analyze_mixed(&self, html: &str) -> Result<Vec<Finding>, ExtractError> {
        let document = self.parse(html)?;

        let mut findings: Vec<Finding> = document
            .select(&self.selectors.job_container)
            .map(|container| Finding::Job(self.extract_job(container)))
            .collect();
        let job_count = findings.len();

        findings.extend(
            document
                .select(&self.selectors.post_container)
                .map(|container| Finding::Post(self.extract_post(container))),
        );

        info!(
            "Extracted {} job listing(s) and {} post(s)",
            job_count,
            findings.len() - job_count
        );
        Ok(findings)
    }

    pub fn scan_page(&self, html: &str) -> Result<PageSnapshot, ExtractError> {
        let document = self.parse(html)?;
        Ok(self.snapshot(&document))
    }

    fn parse(&self, html: &str) -> Result<Html, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let started = Utc::now();
        let mut document = Html::parse_document(html);
        if !document.errors.is_empty() {
            debug!("HTML parser recovered from {} error(s)", document.errors.len());
        }

        sanitize::sanitize_document(&mut document, &self.selectors.risky_elements);
        debug!(
            "Parsed {} bytes in {} ms",
            html.len(),
            (Utc::now() - started).num_milliseconds()
        );

        Ok(document)
    }

    fn emails_in(&self, container: ElementRef) -> Vec<String> {
        self.contacts.emails_in(container, &self.selectors.mailto_link)
    }

    fn phones_in(&self, container: ElementRef) -> Vec<String> {
        let text: String = container.text().collect();
        self.contacts.phones_in(&text)
    }
}

/// Trimmed text of the first match under `scope`, absent when missing or blank
fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
