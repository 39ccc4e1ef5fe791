use scraper::ElementRef;

use super::types::JobListing;
use super::{first_text, ContentExtractor};

impl ContentExtractor {
    pub(super) fn extract_job(&self, container: ElementRef) -> JobListing {
        JobListing {
            title: first_text(container, &self.selectors.job_title),
            company: first_text(container, &self.selectors.job_company),
            location: first_text(container, &self.selectors.job_location),
            description: first_text(container, &self.selectors.job_description),
            emails: self.emails_in(container),
            phones: self.phones_in(container),
            posted_date: first_text(container, &self.selectors.job_posted_date),
        }
    }
}
