use tracing::info;

use crate::application::normalize_search_term;
use crate::data::pagination::{MAX_PAGE_SIZE, Page, PageRequest, Sort, SortField};
use crate::data::post_repository::{NewPost, PostFilter, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};

pub(crate) const POST_SORT_FIELDS: &[SortField] = &[
    SortField::Id,
    SortField::CreatedAt,
    SortField::UpdatedAt,
    SortField::Title,
];

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            is_published: req.is_published,
            author_id,
        };
        let post = self.repo.create_post(new_post).await?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or(DomainError::not_found("post", id))
    }

    pub(crate) async fn update_post(
        &self,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let mut post = self.get_post(post_id).await?;
        post.apply_update(req);
        self.save(post).await
    }

    pub(crate) async fn delete_post(&self, post_id: i64) -> Result<(), DomainError> {
        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::not_found("post", post_id));
        }

        info!(post_id, "post deleted");
        Ok(())
    }

    /// Publishing an already published post succeeds without a write.
    pub(crate) async fn publish(&self, post_id: i64) -> Result<Post, DomainError> {
        self.set_published(post_id, true).await
    }

    pub(crate) async fn unpublish(&self, post_id: i64) -> Result<Post, DomainError> {
        self.set_published(post_id, false).await
    }

    async fn set_published(&self, post_id: i64, is_published: bool) -> Result<Post, DomainError> {
        let mut post = self.get_post(post_id).await?;
        if post.is_published == is_published {
            return Ok(post);
        }

        post.is_published = is_published;
        let post = self.save(post).await?;
        info!(post_id, is_published, "post visibility changed");
        Ok(post)
    }

    async fn save(&self, post: Post) -> Result<Post, DomainError> {
        let id = post.id;
        self.repo
            .update_post(&post)
            .await?
            .ok_or(DomainError::not_found("post", id))
    }

    pub(crate) async fn list_published(&self, page: PageRequest) -> Result<Page<Post>, DomainError> {
        let filter = PostFilter {
            published_only: true,
            author_id: None,
        };
        self.list(filter, page).await
    }

    pub(crate) async fn list_all(&self, page: PageRequest) -> Result<Page<Post>, DomainError> {
        self.list(PostFilter::default(), page).await
    }

    pub(crate) async fn list_by_author(
        &self,
        author_id: i64,
        published_only: bool,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let filter = PostFilter {
            published_only,
            author_id: Some(author_id),
        };
        self.list(filter, page).await
    }

    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, DomainError> {
        page.ensure_valid(POST_SORT_FIELDS)?;
        self.repo.list_posts(filter, page).await
    }

    pub(crate) async fn search(
        &self,
        term: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let term = normalize_search_term("searchTerm", term)?;
        page.ensure_valid(POST_SORT_FIELDS)?;
        self.repo.search_published(&term, page).await
    }

    /// The newest `limit` published posts.
    pub(crate) async fn recent(&self, limit: u32) -> Result<Vec<Post>, DomainError> {
        let page = recent_window(limit)?;
        Ok(self.list_published(page).await?.items)
    }
}

/// First page of `limit` items, newest first. Shared by the "recent" reads.
pub(crate) fn recent_window(limit: u32) -> Result<PageRequest, DomainError> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(DomainError::Validation {
            field: "limit",
            message: "must be 1..100",
        });
    }
    Ok(PageRequest::first(limit, Sort::newest_first()))
}

#[cfg(test)]
mod tests {
    use super::PostService;
    use crate::data::pagination::{PageRequest, Sort, SortDirection, SortField};
    use crate::data::repositories::memory::InMemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, UpdatePostRequest};
    use crate::domain::user::Role;

    async fn store_with_author() -> (InMemoryStore, i64) {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                role: Role::User,
                is_active: true,
            })
            .await
            .expect("user must be created");
        (store, user.id)
    }

    fn create_req(title: &str, is_published: bool) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: format!("body of {title}"),
            is_published,
        }
    }

    fn first_page() -> PageRequest {
        PageRequest::new(0, 10, Sort::newest_first())
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);

        let created = service
            .create_post(
                author_id,
                CreatePostRequest {
                    title: "  hello  ".to_string(),
                    content: "  body of hello \n".to_string(),
                    is_published: false,
                },
            )
            .await
            .expect("create must succeed");
        let fetched = service.get_post(created.id).await.expect("must exist");

        assert_eq!(fetched.title, "hello");
        assert_eq!(fetched.content, "body of hello");
        assert!(!fetched.is_published);
        assert_eq!(fetched.author_id, author_id);
        assert_eq!(fetched.author_username, "alice");
    }

    #[tokio::test]
    async fn create_for_unknown_author_is_not_found() {
        let service = PostService::new(InMemoryStore::new());
        let err = service
            .create_post(77, create_req("hello", true))
            .await
            .expect_err("author must exist");
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: "user",
                id: 77
            }
        ));
    }

    #[tokio::test]
    async fn publish_twice_is_idempotent() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        let post = service
            .create_post(author_id, create_req("draft", false))
            .await
            .expect("create must succeed");

        let first = service.publish(post.id).await.expect("publish must succeed");
        let second = service.publish(post.id).await.expect("second publish must succeed");
        assert!(first.is_published);
        assert!(second.is_published);

        let hidden = service.unpublish(post.id).await.expect("unpublish must succeed");
        assert!(!hidden.is_published);

        assert!(matches!(
            service.publish(999).await,
            Err(DomainError::NotFound { entity: "post", .. })
        ));
    }

    #[tokio::test]
    async fn update_keeps_published_flag_when_omitted() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        let post = service
            .create_post(author_id, create_req("old", true))
            .await
            .expect("create must succeed");

        let updated = service
            .update_post(
                post.id,
                UpdatePostRequest {
                    title: "new".to_string(),
                    content: "new body".to_string(),
                    is_published: None,
                },
            )
            .await
            .expect("update must succeed");

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "new");
        assert!(updated.is_published);
        assert_eq!(updated.author_id, author_id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_published_only() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        service
            .create_post(author_id, create_req("hello world", true))
            .await
            .expect("create must succeed");
        service
            .create_post(author_id, create_req("hello draft", false))
            .await
            .expect("create must succeed");

        let found = service
            .search("HELLO", first_page())
            .await
            .expect("search must succeed");
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].title, "hello world");

        assert!(matches!(
            service.search("  ", first_page()).await,
            Err(DomainError::Validation {
                field: "searchTerm",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn listings_filter_by_visibility_and_author() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        for (title, published) in [("a", true), ("b", false), ("c", true)] {
            service
                .create_post(author_id, create_req(title, published))
                .await
                .expect("create must succeed");
        }

        let published = service
            .list_published(first_page())
            .await
            .expect("list must succeed");
        assert_eq!(published.total, 2);
        assert_eq!(published.items[0].title, "c");

        let all = service.list_all(first_page()).await.expect("list must succeed");
        assert_eq!(all.total, 3);

        let mine = service
            .list_by_author(author_id, false, first_page())
            .await
            .expect("list must succeed");
        assert_eq!(mine.total, 3);
        let others = service
            .list_by_author(author_id + 100, false, first_page())
            .await
            .expect("list must succeed");
        assert_eq!(others.total, 0);

        let by_title = service
            .list_all(PageRequest::new(
                0,
                10,
                Sort::new(SortField::Title, SortDirection::Asc),
            ))
            .await
            .expect("list must succeed");
        let titles: Vec<_> = by_title.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);

        let err = service
            .list_all(PageRequest::new(
                0,
                10,
                Sort::new(SortField::Email, SortDirection::Asc),
            ))
            .await
            .expect_err("email is not a post field");
        assert!(matches!(err, DomainError::Validation { field: "sortBy", .. }));
    }

    #[tokio::test]
    async fn recent_returns_newest_published_posts() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        for title in ["one", "two", "three"] {
            service
                .create_post(author_id, create_req(title, true))
                .await
                .expect("create must succeed");
        }

        let recent = service.recent(2).await.expect("recent must succeed");
        let titles: Vec<_> = recent.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["three", "two"]);

        assert!(service.recent(0).await.is_err());
    }

    #[tokio::test]
    async fn delete_missing_post_is_not_found() {
        let (store, author_id) = store_with_author().await;
        let service = PostService::new(store);
        let post = service
            .create_post(author_id, create_req("bye", true))
            .await
            .expect("create must succeed");

        service.delete_post(post.id).await.expect("delete must succeed");
        assert!(matches!(
            service.get_post(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_post(post.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
