use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::data::pagination::{Page, Sort, SortDirection, SortField};
use crate::domain::error::DomainError;
use crate::domain::user::{Role, SignUpRequest, UpdateUserRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{Json, Path, Query};
use crate::presentation::http::handlers::auth::UserDto;
use crate::presentation::http::handlers::pagination::PageQuery;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::policy::{Endpoint, authorize};

const DEFAULT_USER_SORT: Sort = Sort::new(SortField::Id, SortDirection::Asc);

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateUserDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    #[validate(length(max = 100))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 100))]
    pub(crate) last_name: Option<String>,
    /// Defaults to `USER`.
    pub(crate) role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateUserDto {
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(max = 100))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 100))]
    pub(crate) last_name: Option<String>,
    /// Admin only.
    pub(crate) role: Option<Role>,
    /// Admin only.
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct NameQuery {
    /// Matched against username, first and last name.
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserPageDto {
    pub(crate) content: Vec<UserDto>,
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) total_elements: i64,
    pub(crate) total_pages: i64,
}

impl From<Page<User>> for UserPageDto {
    fn from(page: Page<User>) -> Self {
        let total_pages = page.total_pages();
        Self {
            content: page.items.into_iter().map(UserDto::from).collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Users listed", body = UserPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserPageDto>> {
    authorize(Endpoint::ListUsers, Some(&auth), None)?;
    let page = query.into_request(DEFAULT_USER_SORT)?;

    let users = state.user_service.list_users(page).await?;
    Ok(Json(users.into()))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateUserDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    authorize(Endpoint::CreateUser, Some(&auth), None)?;
    dto.validate()?;

    let role = dto.role.unwrap_or(Role::User);
    let req = SignUpRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };
    let user = state.user_service.create_user(req, role).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the user nor an admin"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDto>> {
    let user = state.user_service.get_user(id).await?;
    authorize(Endpoint::GetUser, Some(&auth), Some(&user.username))?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not permitted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already taken")
    )
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateUserDto>,
) -> AppResult<Json<UserDto>> {
    dto.validate()?;
    let target = state.user_service.get_user(id).await?;
    authorize(Endpoint::UpdateUser, Some(&auth), Some(&target.username))?;

    let req = UpdateUserRequest {
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
        role: dto.role,
        is_active: dto.is_active,
    };
    if !auth.is_admin() && req.changes_privileges_of(&target) {
        return Err(DomainError::Forbidden.into());
    }

    let user = state.user_service.update_user(id, req).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted with their posts and comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Neither the user nor an admin"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let target = state.user_service.get_user(id).await?;
    authorize(Endpoint::DeleteUser, Some(&auth), Some(&target.username))?;

    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/activate",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User active", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn activate_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDto>> {
    authorize(Endpoint::ActivateUser, Some(&auth), None)?;
    let user = state.user_service.activate(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/deactivate",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User inactive", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDto>> {
    authorize(Endpoint::DeactivateUser, Some(&auth), None)?;
    let user = state.user_service.deactivate(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "users",
    security(("bearer_auth" = [])),
    params(NameQuery, PageQuery),
    responses(
        (status = 200, description = "Matching users", body = UserPageDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub(crate) async fn search_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(name): Query<NameQuery>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserPageDto>> {
    authorize(Endpoint::SearchUsers, Some(&auth), None)?;
    let page = query.into_request(DEFAULT_USER_SORT)?;

    let users = state
        .user_service
        .search_users(name.name.as_deref().unwrap_or_default(), page)
        .await?;
    Ok(Json(users.into()))
}

#[utoipa::path(
    get,
    path = "/api/users/role/{role}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("role" = String, Path, description = "USER, ADMIN or MODERATOR")),
    responses(
        (status = 200, description = "Active users holding the role", body = [UserDto]),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub(crate) async fn users_by_role(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(role): Path<String>,
) -> AppResult<Json<Vec<UserDto>>> {
    authorize(Endpoint::UsersByRole, Some(&auth), None)?;
    let role: Role = role.parse()?;

    let users = state.user_service.list_active_by_role(role).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}
