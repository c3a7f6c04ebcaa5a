use tracing::info;

use crate::application::normalize_search_term;
use crate::application::post_service::recent_window;
use crate::data::comment_repository::{CommentFilter, CommentRepository, NewComment};
use crate::data::pagination::{Page, PageRequest, SortField};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;

pub(crate) const COMMENT_SORT_FIELDS: &[SortField] =
    &[SortField::Id, SortField::CreatedAt, SortField::UpdatedAt];

/// Comments need the post store only to tell "no comments" apart from
/// "no such post".
pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.ensure_post_exists(post_id).await?;

        let comment = self
            .comments
            .create_comment(NewComment {
                content: req.content,
                post_id,
                author_id,
            })
            .await?;

        info!(comment_id = comment.id, post_id, author_id, "comment created");
        Ok(comment)
    }

    pub(crate) async fn get_comment(&self, id: i64) -> Result<Comment, DomainError> {
        self.comments
            .get_comment(id)
            .await?
            .ok_or(DomainError::not_found("comment", id))
    }

    pub(crate) async fn update_comment(
        &self,
        id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let mut comment = self.get_comment(id).await?;
        comment.content = req.content;

        self.comments
            .update_comment(&comment)
            .await?
            .ok_or(DomainError::not_found("comment", id))
    }

    pub(crate) async fn delete_comment(&self, id: i64) -> Result<(), DomainError> {
        if !self.comments.delete_comment(id).await? {
            return Err(DomainError::not_found("comment", id));
        }

        info!(comment_id = id, "comment deleted");
        Ok(())
    }

    pub(crate) async fn list_all(&self, page: PageRequest) -> Result<Page<Comment>, DomainError> {
        self.list(CommentFilter::default(), page).await
    }

    pub(crate) async fn list_for_post(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        self.ensure_post_exists(post_id).await?;
        let filter = CommentFilter {
            post_id: Some(post_id),
            author_id: None,
        };
        self.list(filter, page).await
    }

    pub(crate) async fn list_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let filter = CommentFilter {
            post_id: None,
            author_id: Some(author_id),
        };
        self.list(filter, page).await
    }

    async fn list(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        page.ensure_valid(COMMENT_SORT_FIELDS)?;
        self.comments.list_comments(filter, page).await
    }

    pub(crate) async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let term = normalize_search_term("searchTerm", term)?;
        page.ensure_valid(COMMENT_SORT_FIELDS)?;
        self.comments.search_comments(&term, page).await
    }

    pub(crate) async fn recent(&self, limit: u32) -> Result<Vec<Comment>, DomainError> {
        let page = recent_window(limit)?;
        Ok(self.list_all(page).await?.items)
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), DomainError> {
        match self.posts.get_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("post", post_id)),
        }
    }
}
