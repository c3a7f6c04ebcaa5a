pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod pagination;
pub(crate) mod posts;
pub(crate) mod users;
