use scraper::Selector;

use crate::error::ExtractError;

/// Compiled LinkedIn selectors. Class names follow the markup LinkedIn served
/// when these were written; they are expected to drift.
#[derive(Debug)]
pub(crate) struct Selectors {
    pub risky_elements: Selector,

    pub post_container: Selector,
    pub author_name: Selector,
    pub author_title: Selector,
    pub author_connections: Selector,
    pub post_text: Selector,
    pub post_timestamp: Selector,
    pub reactions_count: Selector,
    pub comment_text: Selector,

    pub job_container: Selector,
    pub job_title: Selector,
    pub job_company: Selector,
    pub job_location: Selector,
    pub job_description: Selector,
    pub job_posted_date: Selector,

    pub mailto_link: Selector,

    pub page_title: Selector,
    pub page_heading: Selector,
    pub page_company: Selector,
    pub page_description: Selector,
    pub page_location: Selector,
    pub page_body: Selector,
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        details: e.to_string(),
    })
}

impl Selectors {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Selectors {
            risky_elements: compile(r#"img, iframe, script, link[rel="prefetch"]"#)?,

            post_container: compile(".feed-shared-update-v2")?,
            author_name: compile(
                r#"span[dir="ltr"] span[aria-hidden="true"], .update-components-actor__name"#,
            )?,
            author_title: compile(".update-components-actor__description")?,
            author_connections: compile(".update-components-actor__connections")?,
            post_text: compile(".update-components-text")?,
            post_timestamp: compile(".update-components-actor__sub-description")?,
            reactions_count: compile(".social-details-social-counts__reactions-count")?,
            comment_text: compile(".comments-comment-item-content")?,

            job_container: compile(
                r#".job-details-jobs-unified-top-card, [data-test="job-card-container"]"#,
            )?,
            job_title: compile(
                r#".job-details-jobs-unified-top-card__job-title, [data-test="job-card-title"]"#,
            )?,
            job_company: compile(
                r#"[data-test="company-name"], .jobs-unified-top-card__company-name"#,
            )?,
            job_location: compile(
                r#".job-details-jobs-unified-top-card__bullet, [data-test="job-card-location"]"#,
            )?,
            job_description: compile(r#".description__text, [data-test="job-description"]"#)?,
            job_posted_date: compile(
                r#".jobs-unified-top-card__posted-date, [data-test="job-card-posted-date"]"#,
            )?,

            mailto_link: compile(r#"a[href^="mailto:"][data-test-app-aware-link]"#)?,

            page_title: compile("title")?,
            page_heading: compile("h1")?,
            page_company: compile(r#"[data-test="company-name"]"#)?,
            page_description: compile(".description__text")?,
            page_location: compile(".job-details-jobs-unified-top-card__bullet")?,
            page_body: compile("body")?,
        })
    }
}
