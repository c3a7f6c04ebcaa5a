use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::data::pagination::{Page, Sort};
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{Json, Path, Query};
use crate::presentation::http::handlers::pagination::{LimitQuery, PageQuery, SearchQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::policy::{Endpoint, authorize};

const DEFAULT_RECENT_POSTS: u32 = 5;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 5000))]
    pub(crate) content: String,
    /// Defaults to a draft.
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 5000))]
    pub(crate) content: String,
    /// Left unchanged when omitted.
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(crate) struct MyPostsQuery {
    /// Only the caller's published posts when true.
    pub(crate) published_only: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_published: bool,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            is_published: post.is_published,
            author_id: post.author_id,
            author_username: post.author_username,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) content: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total_elements: i64,
    pub(crate) total_pages: i64,
}

impl From<Page<Post>> for PostPageDto {
    fn from(page: Page<Post>) -> Self {
        let total_pages = page.total_pages();
        Self {
            content: page.items.into_iter().map(PostDto::from).collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Published posts", body = PostPageDto),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn list_published_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    authorize(Endpoint::ListPublishedPosts, None, None)?;
    let page = query.into_request(Sort::newest_first())?;

    let posts = state.post_service.list_published(page).await?;
    Ok(Json(posts.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/all",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All posts including drafts", body = PostPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub(crate) async fn list_all_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    authorize(Endpoint::ListAllPosts, Some(&auth), None)?;
    let page = query.into_request(Sort::newest_first())?;

    let posts = state.post_service.list_all(page).await?;
    Ok(Json(posts.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    authorize(Endpoint::GetPost, None, None)?;
    let post = state.post_service.get_post(id).await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/my-posts",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(MyPostsQuery, PageQuery),
    responses(
        (status = 200, description = "Caller's posts", body = PostPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn my_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(filter): Query<MyPostsQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    authorize(Endpoint::MyPosts, Some(&auth), None)?;
    let page = query.into_request(Sort::newest_first())?;

    let posts = state
        .post_service
        .list_by_author(auth.user_id, filter.published_only.unwrap_or(false), page)
        .await?;
    Ok(Json(posts.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/recent",
    tag = "posts",
    params(LimitQuery),
    responses(
        (status = 200, description = "Newest published posts", body = [PostDto]),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn recent_posts(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<PostDto>>> {
    authorize(Endpoint::RecentPosts, None, None)?;
    let posts = state
        .post_service
        .recent(query.limit.unwrap_or(DEFAULT_RECENT_POSTS))
        .await?;
    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching published posts", body = PostPageDto),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    authorize(Endpoint::SearchPosts, None, None)?;
    let page = query.into_request(Sort::newest_first())?;

    let posts = state
        .post_service
        .search(search.search_term.as_deref().unwrap_or_default(), page)
        .await?;
    Ok(Json(posts.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    authorize(Endpoint::CreatePost, Some(&auth), None)?;
    dto.validate()?;

    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        is_published: dto.is_published.unwrap_or(false),
    };
    let post = state.post_service.create_post(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(id).await?;
    authorize(Endpoint::UpdatePost, Some(&auth), Some(&post.author_username))?;
    dto.validate()?;

    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        is_published: dto.is_published,
    };
    let post = state.post_service.update_post(id, req).await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post and its comments deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let post = state.post_service.get_post(id).await?;
    authorize(Endpoint::DeletePost, Some(&auth), Some(&post.author_username))?;

    state.post_service.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/publish",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post is published", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn publish_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(id).await?;
    authorize(Endpoint::PublishPost, Some(&auth), Some(&post.author_username))?;

    let post = state.post_service.publish(id).await?;
    Ok(Json(post.into()))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/unpublish",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post is a draft", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn unpublish_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let post = state.post_service.get_post(id).await?;
    authorize(Endpoint::UnpublishPost, Some(&auth), Some(&post.author_username))?;

    let post = state.post_service.unpublish(id).await?;
    Ok(Json(post.into()))
}
