use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{Role, SignInRequest, SignUpRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::Json;
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::policy::{Endpoint, authorize};

pub(crate) const SIGN_UP_MESSAGE: &str = "User registered successfully!";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SignUpDto {
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
}

impl From<SignUpDto> for SignUpRequest {
    fn from(dto: SignUpDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            password: dto.password,
            first_name: dto.first_name,
            last_name: dto.last_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SignInDto {
    #[validate(length(min = 1, max = 64))]
    pub(crate) username: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

/// Public projection of a user. There is no password field to leak.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) role: Role,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SignUpResponseDto {
    pub(crate) message: String,
    pub(crate) user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SignInResponseDto {
    pub(crate) token: String,
    #[serde(rename = "type")]
    pub(crate) token_type: String,
    pub(crate) user: UserDto,
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignUpDto,
    responses(
        (status = 200, description = "Registered successfully", body = SignUpResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn sign_up(
    State(state): State<AppState>,
    Json(dto): Json<SignUpDto>,
) -> AppResult<(StatusCode, Json<SignUpResponseDto>)> {
    authorize(Endpoint::SignUp, None, None)?;
    dto.validate()?;

    let user = state.auth_service.sign_up(dto.into()).await?;

    Ok((
        StatusCode::OK,
        Json(SignUpResponseDto {
            message: SIGN_UP_MESSAGE.to_string(),
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SignInDto,
    responses(
        (status = 200, description = "Signed in", body = SignInResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn sign_in(
    State(state): State<AppState>,
    Json(dto): Json<SignInDto>,
) -> AppResult<(StatusCode, Json<SignInResponseDto>)> {
    authorize(Endpoint::SignIn, None, None)?;
    dto.validate()?;

    let req = SignInRequest {
        username: dto.username,
        password: dto.password,
    };
    let result = state.auth_service.sign_in(req).await?;

    Ok((
        StatusCode::OK,
        Json(SignInResponseDto {
            token: result.access_token,
            token_type: "Bearer".to_string(),
            user: result.user.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn current_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserDto>> {
    authorize(Endpoint::CurrentUser, Some(&auth), None)?;
    let user = state.user_service.get_user(auth.user_id).await?;
    Ok(Json(user.into()))
}
