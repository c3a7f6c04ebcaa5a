use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::pagination::{Page, Sort};
use crate::domain::comment::{Comment, CommentRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{Json, Path, Query};
use crate::presentation::http::handlers::pagination::{LimitQuery, PageQuery, SearchQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::policy::{Endpoint, authorize};

const DEFAULT_RECENT_COMMENTS: u32 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentResponseDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentPageDto {
    pub(crate) content: Vec<CommentResponseDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total_elements: i64,
    pub(crate) total_pages: i64,
}

impl From<Page<Comment>> for CommentPageDto {
    fn from(page: Page<Comment>) -> Self {
        let total_pages = page.total_pages();
        Self {
            content: page
                .items
                .into_iter()
                .map(CommentResponseDto::from)
                .collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All comments", body = CommentPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub(crate) async fn list_all_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CommentPageDto>> {
    authorize(Endpoint::ListAllComments, Some(&auth), None)?;
    let page = query.into_request(Sort::newest_first())?;

    let comments = state.comment_service.list_all(page).await?;
    Ok(Json(comments.into()))
}

#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment found", body = CommentResponseDto),
        (status = 404, description = "Comment not found")
    )
)]
pub(crate) async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CommentResponseDto>> {
    authorize(Endpoint::GetComment, None, None)?;
    let comment = state.comment_service.get_comment(id).await?;
    Ok(Json(comment.into()))
}

#[utoipa::path(
    get,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id"), PageQuery),
    responses(
        (status = 200, description = "Comments of the post", body = CommentPageDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn comments_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CommentPageDto>> {
    authorize(Endpoint::CommentsForPost, None, None)?;
    let page = query.into_request(Sort::newest_first())?;

    let comments = state.comment_service.list_for_post(post_id, page).await?;
    Ok(Json(comments.into()))
}

#[utoipa::path(
    get,
    path = "/api/comments/my-comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's comments", body = CommentPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn my_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CommentPageDto>> {
    authorize(Endpoint::MyComments, Some(&auth), None)?;
    let page = query.into_request(Sort::newest_first())?;

    let comments = state
        .comment_service
        .list_by_author(auth.user_id, page)
        .await?;
    Ok(Json(comments.into()))
}

#[utoipa::path(
    get,
    path = "/api/comments/search",
    tag = "comments",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching comments", body = CommentPageDto),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn search_comments(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<CommentPageDto>> {
    authorize(Endpoint::SearchComments, None, None)?;
    let page = query.into_request(Sort::newest_first())?;

    let comments = state
        .comment_service
        .search(search.search_term.as_deref().unwrap_or_default(), page)
        .await?;
    Ok(Json(comments.into()))
}

#[utoipa::path(
    get,
    path = "/api/comments/recent",
    tag = "comments",
    params(LimitQuery),
    responses(
        (status = 200, description = "Newest comments", body = [CommentResponseDto]),
        (status = 400, description = "Validation error")
    )
)]
pub(crate) async fn recent_comments(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<CommentResponseDto>>> {
    authorize(Endpoint::RecentComments, None, None)?;
    let comments = state
        .comment_service
        .recent(query.limit.unwrap_or(DEFAULT_RECENT_COMMENTS))
        .await?;
    Ok(Json(
        comments.into_iter().map(CommentResponseDto::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("post_id" = i64, Path, description = "Post id")),
    request_body = CommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CommentDto>,
) -> AppResult<(StatusCode, Json<CommentResponseDto>)> {
    authorize(Endpoint::CreateComment, Some(&auth), None)?;
    dto.validate()?;

    let req = CommentRequest {
        content: dto.content,
    };
    let comment = state
        .comment_service
        .create_comment(post_id, auth.user_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    request_body = CommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Comment not found")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<CommentDto>,
) -> AppResult<Json<CommentResponseDto>> {
    let comment = state.comment_service.get_comment(id).await?;
    authorize(
        Endpoint::UpdateComment,
        Some(&auth),
        Some(&comment.author_username),
    )?;
    dto.validate()?;

    let req = CommentRequest {
        content: dto.content,
    };
    let comment = state.comment_service.update_comment(id, req).await?;
    Ok(Json(comment.into()))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Comment not found")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let comment = state.comment_service.get_comment(id).await?;
    authorize(
        Endpoint::DeleteComment,
        Some(&auth),
        Some(&comment.author_username),
    )?;

    state.comment_service.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
