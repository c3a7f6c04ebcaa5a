use crate::domain::error::DomainError;

pub(crate) mod auth_service;
pub(crate) mod comment_service;
pub(crate) mod post_service;
pub(crate) mod user_service;

const SEARCH_TERM_MAX_CHARS: usize = 100;

pub(crate) fn normalize_search_term(field: &'static str, term: &str) -> Result<String, DomainError> {
    let term = term.trim();
    if term.is_empty() || term.chars().count() > SEARCH_TERM_MAX_CHARS {
        return Err(DomainError::Validation {
            field,
            message: "must be 1..100 chars",
        });
    }
    Ok(term.to_string())
}
