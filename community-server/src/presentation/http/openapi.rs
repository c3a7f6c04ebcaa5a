use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::user::Role;
use crate::presentation::http::app_error::ErrorBody;
use crate::presentation::http::handlers::auth::{
    SignInDto, SignInResponseDto, SignUpDto, SignUpResponseDto, UserDto,
};
use crate::presentation::http::handlers::comments::{
    CommentDto, CommentPageDto, CommentResponseDto,
};
use crate::presentation::http::handlers::posts::{
    CreatePostDto, PostDto, PostPageDto, UpdatePostDto,
};
use crate::presentation::http::handlers::users::{CreateUserDto, UpdateUserDto, UserPageDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::auth::sign_up,
        crate::presentation::http::handlers::auth::sign_in,
        crate::presentation::http::handlers::auth::current_user,
        crate::presentation::http::handlers::users::list_users,
        crate::presentation::http::handlers::users::create_user,
        crate::presentation::http::handlers::users::get_user,
        crate::presentation::http::handlers::users::update_user,
        crate::presentation::http::handlers::users::delete_user,
        crate::presentation::http::handlers::users::activate_user,
        crate::presentation::http::handlers::users::deactivate_user,
        crate::presentation::http::handlers::users::search_users,
        crate::presentation::http::handlers::users::users_by_role,
        crate::presentation::http::handlers::posts::list_published_posts,
        crate::presentation::http::handlers::posts::list_all_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::my_posts,
        crate::presentation::http::handlers::posts::recent_posts,
        crate::presentation::http::handlers::posts::search_posts,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::publish_post,
        crate::presentation::http::handlers::posts::unpublish_post,
        crate::presentation::http::handlers::comments::list_all_comments,
        crate::presentation::http::handlers::comments::get_comment,
        crate::presentation::http::handlers::comments::comments_for_post,
        crate::presentation::http::handlers::comments::my_comments,
        crate::presentation::http::handlers::comments::search_comments,
        crate::presentation::http::handlers::comments::recent_comments,
        crate::presentation::http::handlers::comments::create_comment,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::delete_comment
    ),
    components(
        schemas(
            ErrorBody,
            Role,
            SignUpDto,
            SignInDto,
            SignUpResponseDto,
            SignInResponseDto,
            UserDto,
            UserPageDto,
            CreateUserDto,
            UpdateUserDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostPageDto,
            CommentDto,
            CommentResponseDto,
            CommentPageDto
        )
    ),
    tags(
        (name = "auth", description = "Sign-up, sign-in and current identity"),
        (name = "users", description = "User administration and profiles"),
        (name = "posts", description = "Posts and their visibility"),
        (name = "comments", description = "Comments on posts")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_resource_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/signin",
            "/api/users/{id}",
            "/api/posts/{id}/publish",
            "/api/comments/post/{post_id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components must be present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
