use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_all_posts, list_published_posts, my_posts,
    publish_post, recent_posts, search_posts, unpublish_post, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_published_posts))
        .route("/recent", get(recent_posts))
        .route("/search", get(search_posts))
        .route("/{id}", get(get_post));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/all", get(list_all_posts))
        .route("/my-posts", get(my_posts))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/publish", put(publish_post))
        .route("/{id}/unpublish", put(unpublish_post))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
