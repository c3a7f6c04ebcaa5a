//! Access rules per endpoint, evaluated by handlers before a service runs.
//!
//! The bearer middleware establishes identity first, so a bad token is
//! always `Unauthorized` before any role or ownership decision. Ownership
//! rules need the owner's username, which the caller obtains by loading the
//! target; a missing target therefore fails as `NotFound` before this table
//! is consulted.

use crate::domain::error::DomainError;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Authenticated,
    OwnerOrAdmin,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endpoint {
    SignUp,
    SignIn,
    CurrentUser,

    ListUsers,
    CreateUser,
    GetUser,
    UpdateUser,
    DeleteUser,
    ActivateUser,
    DeactivateUser,
    SearchUsers,
    UsersByRole,

    ListPublishedPosts,
    ListAllPosts,
    GetPost,
    MyPosts,
    RecentPosts,
    SearchPosts,
    CreatePost,
    UpdatePost,
    DeletePost,
    PublishPost,
    UnpublishPost,

    ListAllComments,
    GetComment,
    CommentsForPost,
    MyComments,
    SearchComments,
    RecentComments,
    CreateComment,
    UpdateComment,
    DeleteComment,
}

impl Endpoint {
    pub(crate) const fn access(self) -> Access {
        use Endpoint::*;

        match self {
            SignUp | SignIn | ListPublishedPosts | GetPost | RecentPosts | SearchPosts
            | GetComment | CommentsForPost | SearchComments | RecentComments => Access::Public,

            CurrentUser | SearchUsers | MyPosts | CreatePost | MyComments | CreateComment => {
                Access::Authenticated
            }

            GetUser | UpdateUser | DeleteUser | UpdatePost | DeletePost | PublishPost
            | UnpublishPost | UpdateComment | DeleteComment => Access::OwnerOrAdmin,

            ListUsers | CreateUser | ActivateUser | DeactivateUser | UsersByRole | ListAllPosts
            | ListAllComments => Access::AdminOnly,
        }
    }
}

/// `owner` is the username that owns the target resource; only consulted by
/// owner-or-admin rules.
pub(crate) fn authorize(
    endpoint: Endpoint,
    caller: Option<&AuthenticatedUser>,
    owner: Option<&str>,
) -> Result<(), AppError> {
    let access = endpoint.access();
    if access == Access::Public {
        return Ok(());
    }

    let caller = caller.ok_or(AppError::Unauthorized)?;
    let allowed = match access {
        Access::Public | Access::Authenticated => true,
        Access::AdminOnly => caller.is_admin(),
        Access::OwnerOrAdmin => caller.is_admin() || owner == Some(caller.username.as_str()),
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden.into())
    }
}
