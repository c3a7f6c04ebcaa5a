use std::sync::Arc;

use async_trait::async_trait;

use crate::data::pagination::{Page, PageRequest};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_published: bool,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PostFilter {
    pub(crate) published_only: bool,
    pub(crate) author_id: Option<i64>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    /// Persists title, content and the published flag. `None` when the row is gone.
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError>;
    /// Removes the post together with its comments.
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError>;
    /// Case-insensitive substring match on title or content, published posts only.
    async fn search_published(&self, term: &str, page: PageRequest) -> Result<Page<Post>, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        (**self).update_post(post).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }

    async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError> {
        (**self).list_posts(filter, page).await
    }

    async fn search_published(&self, term: &str, page: PageRequest) -> Result<Page<Post>, DomainError> {
        (**self).search_published(term, page).await
    }
}
