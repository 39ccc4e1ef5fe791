use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::store::ContactRecord;

const DEFAULT_SUBJECT: &str = "Introduction | REF {name}";

const DEFAULT_BODY: &str = r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; padding: 20px;">
<p>Hi {first_name},</p>

<p>I hope you're doing well!</p>

<p>
  I came across your post on LinkedIn and would love to connect about the roles you are hiring for.
  My resume is attached; feel free to reach out if you'd like to explore this further.
</p>

<p>Best regards</p>
</div>"#;

/// Subject and HTML body with `{name}` and `{first_name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachTemplate {
    pub subject: String,
    pub body_html: String,
}

impl Default for OutreachTemplate {
    fn default() -> Self {
        OutreachTemplate {
            subject: DEFAULT_SUBJECT.to_string(),
            body_html: DEFAULT_BODY.to_string(),
        }
    }
}

impl OutreachTemplate {
    pub fn new(subject: impl Into<String>, body_html: impl Into<String>) -> Self {
        OutreachTemplate {
            subject: subject.into(),
            body_html: body_html.into(),
        }
    }

    /// Load the body from an HTML file, keeping the given subject
    pub fn from_file(subject: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body_html = fs::read_to_string(path)
            .with_context(|| format!("Unable to read mail template {:?}", path))?;
        Ok(OutreachTemplate::new(subject, body_html))
    }

    /// Returns (subject, html) for one contact
    pub fn render(&self, contact: &ContactRecord) -> (String, String) {
        let name = contact.author_name.trim();
        let first_name = contact.first_name().unwrap_or("there");

        let subject = fill(&self.subject, first_name, name);
        let html = fill(&self.body_html, &escape_html(first_name), &escape_html(name));

        (subject.trim().to_string(), html)
    }
}

/// Single left-to-right pass; substituted values are never rescanned
fn fill(text: &str, first_name: &str, name: &str) -> String {
    let mut filled = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        filled.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{first_name}") {
            filled.push_str(first_name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{name}") {
            filled.push_str(name);
            rest = after;
        } else {
            filled.push('{');
            rest = &tail[1..];
        }
    }

    filled.push_str(rest);
    filled
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
