use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub(crate) const COMMENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Body of both create and update; content is the only mutable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentRequest {
    pub(crate) content: String,
}

impl CommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        if content.is_empty() || content.chars().count() > COMMENT_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "content",
                message: "must be 1..1000 chars",
            });
        }
        Ok(Self {
            content: content.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CommentRequest;

    #[test]
    fn comment_request_trims_content() {
        let req = CommentRequest {
            content: "  nice post  ".to_string(),
        };
        assert_eq!(req.validate().expect("must validate").content, "nice post");
    }

    #[test]
    fn comment_request_rejects_blank_and_oversized_content() {
        let blank = CommentRequest {
            content: " \n ".to_string(),
        };
        assert!(blank.validate().is_err());

        let oversized = CommentRequest {
            content: "é".repeat(1001),
        };
        assert!(oversized.validate().is_err());

        let at_limit = CommentRequest {
            content: "é".repeat(1000),
        };
        assert!(at_limit.validate().is_ok());
    }
}
