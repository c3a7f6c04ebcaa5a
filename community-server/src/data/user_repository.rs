use std::sync::Arc;

use async_trait::async_trait;

use crate::data::pagination::{Page, PageRequest};
use crate::domain::error::DomainError;
use crate::domain::user::{Role, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) role: Role,
    pub(crate) is_active: bool,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    /// Persists the mutable fields of `user`. `None` when the row is gone.
    async fn update_user(&self, user: &User) -> Result<Option<User>, DomainError>;
    async fn delete_user(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError>;
    /// Case-insensitive substring match on username, first or last name.
    async fn search_users(&self, term: &str, page: PageRequest) -> Result<Page<User>, DomainError>;
    async fn list_active_by_role(&self, role: Role) -> Result<Vec<User>, DomainError>;
}

#[async_trait]
impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        (**self).create_user(input).await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        (**self).get_user(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        (**self).find_by_email(email).await
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, DomainError> {
        (**self).update_user(user).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_user(id).await
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        (**self).list_users(page).await
    }

    async fn search_users(&self, term: &str, page: PageRequest) -> Result<Page<User>, DomainError> {
        (**self).search_users(term, page).await
    }

    async fn list_active_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        (**self).list_active_by_role(role).await
    }
}
