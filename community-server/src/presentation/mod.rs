use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::user_service::UserService;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type UserRepo = Arc<dyn UserRepository>;
pub(crate) type PostRepo = Arc<dyn PostRepository>;
pub(crate) type CommentRepo = Arc<dyn CommentRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<UserRepo>>,
    pub(crate) user_service: Arc<UserService<UserRepo>>,
    pub(crate) post_service: Arc<PostService<PostRepo>>,
    pub(crate) comment_service: Arc<CommentService<CommentRepo, PostRepo>>,
}

impl AppState {
    pub(crate) fn new(
        users: UserRepo,
        posts: PostRepo,
        comments: CommentRepo,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt)),
            user_service: Arc::new(UserService::new(users)),
            post_service: Arc::new(PostService::new(posts.clone())),
            comment_service: Arc::new(CommentService::new(comments, posts)),
        }
    }
}
