use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Result of validating one candidate address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEmail {
    pub original: String,
    pub cleaned: Option<String>,
    pub is_valid: bool,
}

/// Cleans and validates candidate email addresses scraped from page text.
///
/// Text nodes on LinkedIn pages are often concatenated without separators,
/// so an address can come out as `jane@example.comSubject`. The cleaning step
/// only knows a short list of TLDs and trailing words; anything outside that
/// list is left as-is and usually rejected by the syntax check.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    glued_suffix: Regex,
    syntax: Regex,
}

impl EmailValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(EmailValidator {
            glued_suffix: Regex::new(
                r"(?i)\.(com|co\.in|net|org|edu)(hashtag|Subject|Job|At|Role|Let|Join|or|For).*",
            )?,
            syntax: Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")?,
        })
    }

    /// Strip a glued suffix, then return the address if it is syntactically valid
    pub fn validate_and_clean(&self, email: &str) -> Option<String> {
        let cleaned = self.clean_domain_suffix(email);
        if self.is_valid_email(&cleaned) {
            Some(cleaned)
        } else {
            debug!("Rejected email candidate: {}", email);
            None
        }
    }

    pub fn is_valid_email(&self, email: &str) -> bool {
        self.syntax.is_match(email)
    }

    fn clean_domain_suffix(&self, email: &str) -> String {
        self.glued_suffix.replacen(email, 1, ".${1}").into_owned()
    }

    /// Validate a batch, keeping only the entries that produced a cleaned address
    pub fn process_emails<S: AsRef<str>>(&self, emails: &[S]) -> Vec<ValidatedEmail> {
        emails
            .iter()
            .map(|email| {
                let original = email.as_ref();
                ValidatedEmail {
                    original: original.to_string(),
                    cleaned: self.validate_and_clean(original),
                    is_valid: self.is_valid_email(original),
                }
            })
            .filter(|result| result.cleaned.is_some())
            .collect()
    }

    /// Convenience over `process_emails` returning only the cleaned addresses
    pub fn clean_all<S: AsRef<str>>(&self, emails: &[S]) -> Vec<String> {
        self.process_emails(emails)
            .into_iter()
            .filter_map(|result| result.cleaned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> EmailValidator {
        EmailValidator::new().unwrap()
    }

    #[test]
    fn test_strips_glued_subject() {
        let v = validator();
        assert_eq!(
            v.validate_and_clean("jane.doe@example.comSubject: Interview"),
            Some("jane.doe@example.com".to_string())
        );
        assert_eq!(
            v.validate_and_clean("hr@company.co.inJoin"),
            Some("hr@company.co.in".to_string())
        );
        assert_eq!(
            v.validate_and_clean("jobs@school.eduhashtag"),
            Some("jobs@school.edu".to_string())
        );
    }

    #[test]
    fn test_accepts_mixed_case() {
        let v = validator();
        assert_eq!(
            v.validate_and_clean("Jane.Doe@Example.COM"),
            Some("Jane.Doe@Example.COM".to_string())
        );
    }

    #[test]
    fn test_unknown_suffix_is_left_alone() {
        // Only listed suffix words are stripped; letters still form a valid TLD
        let v = validator();
        assert_eq!(
            v.validate_and_clean("a@b.comHiring"),
            Some("a@b.comHiring".to_string())
        );
        assert_eq!(v.validate_and_clean("a@b.io1"), None);
        assert_eq!(v.validate_and_clean("not an email"), None);
        assert_eq!(v.validate_and_clean(""), None);
    }

    #[test]
    fn test_process_emails_filters_invalid() {
        let v = validator();
        let results = v.process_emails(&["ok@site.org", "broken@", "x@y.netRole"]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_valid);
        assert_eq!(results[1].cleaned.as_deref(), Some("x@y.net"));
        assert!(results
            .iter()
            .all(|r| v.is_valid_email(r.cleaned.as_deref().unwrap())));
    }

    #[test]
    fn test_deterministic() {
        let v = validator();
        for input in ["a@b.comAt", "weird@@x", "Z@Q.EDU", "m@n.orgFor more"] {
            assert_eq!(v.validate_and_clean(input), v.validate_and_clean(input));
            if let Some(cleaned) = v.validate_and_clean(input) {
                assert!(v.is_valid_email(&cleaned));
            }
        }
    }
}
