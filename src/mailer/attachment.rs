use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::MailerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// Provides the one file attached to every message of a batch
pub trait AttachmentSource: Send + Sync {
    fn load(&self) -> Result<MailAttachment, MailerError>;
}

/// Reads the attachment from disk each time a batch starts
#[derive(Debug, Clone)]
pub struct FileAttachment {
    path: PathBuf,
}

impl FileAttachment {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileAttachment {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AttachmentSource for FileAttachment {
    fn load(&self) -> Result<MailAttachment, MailerError> {
        let content = fs::read(&self.path).map_err(|source| MailerError::Attachment {
            path: self.path.clone(),
            source,
        })?;

        let filename = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = guess_content_type(&filename);

        debug!(
            "Loaded attachment {} ({}, {} bytes)",
            filename,
            content_type,
            content.len()
        );

        Ok(MailAttachment {
            filename,
            content,
            content_type,
        })
    }
}

/// Already-loaded bytes, for callers that build the attachment themselves
impl AttachmentSource for MailAttachment {
    fn load(&self) -> Result<MailAttachment, MailerError> {
        Ok(self.clone())
    }
}

pub fn guess_content_type(filename: &str) -> String {
    let lowercase_name = filename.to_lowercase();
    if lowercase_name.ends_with(".pdf") {
        "application/pdf".to_string()
    } else if lowercase_name.ends_with(".doc") {
        "application/msword".to_string()
    } else if lowercase_name.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string()
    } else if lowercase_name.ends_with(".txt") {
        "text/plain".to_string()
    } else if lowercase_name.ends_with(".html") || lowercase_name.ends_with(".htm") {
        "text/html".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("Resume.PDF"), "application/pdf");
        assert_eq!(guess_content_type("notes.txt"), "text/plain");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }

    #[test]
    fn test_file_attachment_reads_at_load_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        let source = FileAttachment::new(&path);
        assert_eq!(source.path(), path);

        assert!(matches!(source.load(), Err(MailerError::Attachment { .. })));

        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let attachment = source.load().unwrap();
        assert_eq!(attachment.filename, "resume.pdf");
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.content, b"%PDF-1.4");
    }
}
