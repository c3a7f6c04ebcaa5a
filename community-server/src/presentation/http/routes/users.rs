use axum::Router;
use axum::middleware;
use axum::routing::{get, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::users::{
    activate_user, create_user, deactivate_user, delete_user, get_user, list_users,
    search_users, update_user, users_by_role,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

/// Every user route needs an identity.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/search", get(search_users))
        .route("/role/{role}", get(users_by_role))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/activate", put(activate_user))
        .route("/{id}/deactivate", put(deactivate_user))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
