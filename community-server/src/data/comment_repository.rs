use std::sync::Arc;

use async_trait::async_trait;

use crate::data::pagination::{Page, PageRequest};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CommentFilter {
    pub(crate) post_id: Option<i64>,
    pub(crate) author_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(&self, comment: &Comment) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_comments(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError>;
    async fn search_comments(&self, term: &str, page: PageRequest) -> Result<Page<Comment>, DomainError>;
}

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        (**self).create_comment(input).await
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        (**self).get_comment(id).await
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Option<Comment>, DomainError> {
        (**self).update_comment(comment).await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_comment(id).await
    }

    async fn list_comments(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        (**self).list_comments(filter, page).await
    }

    async fn search_comments(&self, term: &str, page: PageRequest) -> Result<Page<Comment>, DomainError> {
        (**self).search_comments(term, page).await
    }
}
