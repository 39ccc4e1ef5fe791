use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::email_validator::EmailValidator;

/// Email and phone patterns applied to the text of one container
#[derive(Debug, Clone)]
pub(crate) struct ContactPatterns {
    validator: EmailValidator,
    email: Regex,
    phones: Vec<Regex>,
}

impl ContactPatterns {
    pub fn new(validator: EmailValidator) -> Result<Self, regex::Error> {
        let phone_patterns = [
            // +1 (415) 555-1234
            r"\+[0-9]{1,3}\s*\([0-9]{3}\)\s*[0-9]{3}[-\s]?[0-9]{4}",
            // (415) 555-1234
            r"\([0-9]{3}\)\s*[0-9]{3}[-\s]?[0-9]{4}",
            // 415-555-1234, 415 555 1234, 4155551234
            r"\b[0-9]{3}[-\s]?[0-9]{3}[-\s]?[0-9]{4}\b",
            // +91 415 555 1234
            r"\+[0-9]{1,3}\s*[0-9]{3}\s*[0-9]{3}\s*[0-9]{4}",
        ];

        Ok(ContactPatterns {
            validator,
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
            phones: phone_patterns
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn validator(&self) -> &EmailValidator {
        &self.validator
    }

    /// Emails from `mailto:` anchors when there are any, otherwise from the
    /// container text. Either way only validated addresses come back.
    pub fn emails_in(&self, container: ElementRef, mailto_link: &Selector) -> Vec<String> {
        let from_links: Vec<String> = container
            .select(mailto_link)
            .filter_map(|link| link.value().attr("href"))
            .map(mailto_address)
            .collect();

        if from_links.is_empty() {
            let text = rendered_text(container);
            self.validator.clean_all(&self.email_candidates(&text))
        } else {
            self.validator.clean_all(&from_links)
        }
    }

    pub fn email_candidates(&self, text: &str) -> Vec<String> {
        self.email
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Every phone-like match, whitespace-normalized, deduplicated in first-seen order
    pub fn phones_in(&self, text: &str) -> Vec<String> {
        let mut phones: Vec<String> = Vec::new();

        for pattern in &self.phones {
            for m in pattern.find_iter(text) {
                let normalized = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
                if !phones.contains(&normalized) {
                    phones.push(normalized);
                }
            }
        }

        phones
    }
}

/// Elements that start on their own line when the page is rendered
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section", "table", "tr",
    "ul",
];

/// Container text with a line break around every block element, so the last
/// word of one paragraph never runs into the first word of the next
fn rendered_text(container: ElementRef) -> String {
    let mut text = String::new();
    push_rendered_text(container, &mut text);
    text
}

fn push_rendered_text(element: ElementRef, out: &mut String) {
    let block = BLOCK_ELEMENTS.contains(&element.value().name());
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            push_rendered_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }

    if block {
        out.push('\n');
    }
}

fn mailto_address(href: &str) -> String {
    let address = href.strip_prefix("mailto:").unwrap_or(href);
    let address = address.split('?').next().unwrap_or(address);
    address.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn patterns() -> ContactPatterns {
        ContactPatterns::new(EmailValidator::new().unwrap()).unwrap()
    }

    #[test]
    fn test_mailto_address() {
        assert_eq!(mailto_address("mailto:a@b.com"), "a@b.com");
        assert_eq!(mailto_address("mailto: a@b.com?subject=Hi"), "a@b.com");
    }

    #[test]
    fn test_paragraph_break_separates_email_from_next_word() {
        let html = Html::parse_fragment(
            "<div><p>Send CVs to jane@example.com</p><p>Hiring now in Berlin</p></div>",
        );
        let container = html.select(&Selector::parse("div").unwrap()).next().unwrap();
        let mailto = Selector::parse("a[href^=\"mailto:\"]").unwrap();

        assert_eq!(patterns().emails_in(container, &mailto), vec!["jane@example.com"]);
    }

    #[test]
    fn test_inline_elements_do_not_break_text() {
        let html = Html::parse_fragment("<div><span>jane.doe</span>@<b>example.com</b></div>");
        let container = html.select(&Selector::parse("div").unwrap()).next().unwrap();

        assert_eq!(rendered_text(container), "\njane.doe@example.com\n");
    }

    #[test]
    fn test_phones_keep_distinct_formats() {
        let phones = patterns().phones_in("Call (415) 555-1234 or 415-555-1234");
        assert_eq!(phones, vec!["(415) 555-1234", "415-555-1234"]);
    }

    #[test]
    fn test_phones_normalize_whitespace() {
        let phones = patterns().phones_in("Office: +44  (020)   555 1234");
        assert_eq!(phones[0], "+44 (020) 555 1234");
        assert!(phones.contains(&"(020) 555 1234".to_string()));
    }

    #[test]
    fn test_phones_dedupe_repeats() {
        let phones = patterns().phones_in("415-555-1234, again 415-555-1234");
        assert_eq!(phones, vec!["415-555-1234"]);
    }

    #[test]
    fn test_no_phone_in_plain_text() {
        assert!(patterns().phones_in("Hiring 3 engineers in 2024").is_empty());
    }
}
