use scraper::Html;

use super::types::PageSnapshot;
use super::{first_text, ContentExtractor};

/// Shapes the whole-page regex scan tends to pick up from tracking strings
fn is_plausible_address(candidate: &str) -> bool {
    let local_len = candidate.split('@').next().map_or(0, str::len);
    !candidate.contains("..")
        && !candidate.contains(".-")
        && !candidate.contains("-.")
        && !candidate.ends_with('.')
        && local_len > 1
}

impl ContentExtractor {
    pub(super) fn snapshot(&self, document: &Html) -> PageSnapshot {
        let root = document.root_element();

        let title = first_text(root, &self.selectors.page_title)
            .map(|title| title.replace("| LinkedIn", "").trim().to_string())
            .filter(|title| !title.is_empty());

        let body_text: String = root
            .select(&self.selectors.page_body)
            .next()
            .unwrap_or(root)
            .text()
            .collect();

        let candidates: Vec<String> = self
            .contacts
            .email_candidates(&body_text)
            .into_iter()
            .filter(|candidate| is_plausible_address(candidate))
            .collect();

        PageSnapshot {
            title,
            name: first_text(root, &self.selectors.page_heading),
            company: first_text(root, &self.selectors.page_company),
            description: first_text(root, &self.selectors.page_description),
            location: first_text(root, &self.selectors.page_location),
            emails: self.validator().clean_all(&candidates),
            phones: self.contacts.phones_in(&body_text),
        }
    }
}
