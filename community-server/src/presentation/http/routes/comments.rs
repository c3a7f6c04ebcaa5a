use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    comments_for_post, create_comment, delete_comment, get_comment, list_all_comments,
    my_comments, recent_comments, search_comments, update_comment,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/recent", get(recent_comments))
        .route("/search", get(search_comments))
        .route("/post/{post_id}", get(comments_for_post))
        .route("/{id}", get(get_comment));

    let protected = Router::new()
        .route("/", get(list_all_comments))
        .route("/my-comments", get(my_comments))
        .route("/post/{post_id}", post(create_comment))
        .route("/{id}", put(update_comment).delete(delete_comment))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
