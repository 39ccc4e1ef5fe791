use chrono::Utc;
use scraper::ElementRef;
use uuid::Uuid;

use super::types::{Author, ExtractedPost, PostComment, Reactions};
use super::{first_text, ContentExtractor};

impl ContentExtractor {
    pub(super) fn extract_post(&self, container: ElementRef) -> ExtractedPost {
        ExtractedPost {
            id: Uuid::new_v4().to_string(),
            author: self.extract_author(container),
            content: first_text(container, &self.selectors.post_text).unwrap_or_default(),
            timestamp: first_text(container, &self.selectors.post_timestamp),
            reactions: self.extract_reactions(container),
            comments: self.extract_comments(container),
            emails: self.emails_in(container),
            phones: self.phones_in(container),
        }
    }

    fn extract_author(&self, container: ElementRef) -> Author {
        Author {
            name: first_text(container, &self.selectors.author_name)
                .unwrap_or_else(|| "Unknown".to_string()),
            title: first_text(container, &self.selectors.author_title),
            connection_degree: self.extract_connection_degree(container),
        }
    }

    fn extract_connection_degree(&self, container: ElementRef) -> Option<u8> {
        let badge = first_text(container, &self.selectors.author_connections)?;
        if badge.contains("2nd") {
            Some(2)
        } else if badge.contains("3rd") {
            Some(3)
        } else {
            None
        }
    }

    /// Only the total is on the page; the per-type breakdown stays zeroed
    fn extract_reactions(&self, container: ElementRef) -> Reactions {
        let digits: String = first_text(container, &self.selectors.reactions_count)
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();

        Reactions {
            count: digits.parse().unwrap_or(0),
            ..Reactions::default()
        }
    }

    fn extract_comments(&self, container: ElementRef) -> Vec<PostComment> {
        container
            .select(&self.selectors.comment_text)
            .map(|comment| PostComment {
                id: Uuid::new_v4().to_string(),
                author: Author {
                    name: "Anonymous".to_string(),
                    title: None,
                    connection_degree: None,
                },
                content: comment.text().collect::<String>().trim().to_string(),
                captured_at: Utc::now(),
            })
            .collect()
    }
}
