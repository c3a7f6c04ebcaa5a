use tracing::info;

use crate::application::auth_service::register;
use crate::application::normalize_search_term;
use crate::data::pagination::{Page, PageRequest, SortField};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{Role, SignUpRequest, UpdateUserRequest, User};
use crate::infrastructure::password::PasswordHasher;

pub(crate) const USER_SORT_FIELDS: &[SortField] = &[
    SortField::Id,
    SortField::CreatedAt,
    SortField::UpdatedAt,
    SortField::Username,
    SortField::Email,
    SortField::FirstName,
    SortField::LastName,
];

pub(crate) struct UserService<R: UserRepository> {
    repo: R,
    hasher: PasswordHasher,
}

impl<R: UserRepository> UserService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self {
            repo,
            hasher: PasswordHasher,
        }
    }

    /// Admin-side account creation. Same rules as sign-up, but the role is
    /// chosen by the caller.
    pub(crate) async fn create_user(
        &self,
        req: SignUpRequest,
        role: Role,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let user = register(&self.repo, &self.hasher, req, role).await?;

        info!(user_id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub(crate) async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or(DomainError::not_found("user", id))
    }

    pub(crate) async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        page.ensure_valid(USER_SORT_FIELDS)?;
        self.repo.list_users(page).await
    }

    /// Load, overwrite the whitelist, save. Whether the caller may touch
    /// `role`/`is_active` is decided before this is called.
    pub(crate) async fn update_user(
        &self,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let mut user = self.get_user(id).await?;
        user.apply_update(req);

        self.repo
            .update_user(&user)
            .await?
            .ok_or(DomainError::not_found("user", id))
    }

    pub(crate) async fn delete_user(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_user(id).await? {
            return Err(DomainError::not_found("user", id));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }

    pub(crate) async fn activate(&self, id: i64) -> Result<User, DomainError> {
        self.set_active(id, true).await
    }

    /// Outstanding tokens of the user keep working until they expire; only
    /// new sign-ins are refused.
    pub(crate) async fn deactivate(&self, id: i64) -> Result<User, DomainError> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<User, DomainError> {
        let mut user = self.get_user(id).await?;
        if user.is_active == is_active {
            return Ok(user);
        }

        user.is_active = is_active;
        let user = self
            .repo
            .update_user(&user)
            .await?
            .ok_or(DomainError::not_found("user", id))?;

        info!(user_id = id, is_active, "user active flag changed");
        Ok(user)
    }

    pub(crate) async fn search_users(
        &self,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let name = normalize_search_term("name", name)?;
        page.ensure_valid(USER_SORT_FIELDS)?;
        self.repo.search_users(&name, page).await
    }

    pub(crate) async fn list_active_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        self.repo.list_active_by_role(role).await
    }
}

#[cfg(test)]
mod tests {
    use super::UserService;
    use crate::data::pagination::{PageRequest, Sort, SortDirection, SortField};
    use crate::data::repositories::memory::InMemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::user::{Role, SignUpRequest, UpdateUserRequest};

    fn sign_up(username: &str, first_name: Option<&str>) -> SignUpRequest {
        SignUpRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret123".to_string(),
            first_name: first_name.map(str::to_string),
            last_name: None,
        }
    }

    fn by_id() -> PageRequest {
        PageRequest::new(0, 10, Sort::new(SortField::Id, SortDirection::Asc))
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let service = UserService::new(InMemoryStore::new());
        let created = service
            .create_user(sign_up("moder", Some("Mo")), Role::Moderator)
            .await
            .expect("create must succeed");

        let fetched = service.get_user(created.id).await.expect("must exist");
        assert_eq!(fetched.username, "moder");
        assert_eq!(fetched.email, "moder@example.com");
        assert_eq!(fetched.first_name.as_deref(), Some("Mo"));
        assert_eq!(fetched.role, Role::Moderator);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let service = UserService::new(InMemoryStore::new());
        let err = service.get_user(42).await.expect_err("must be missing");
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: "user",
                id: 42
            }
        ));
    }

    #[tokio::test]
    async fn update_overwrites_whitelist_and_checks_email_uniqueness() {
        let service = UserService::new(InMemoryStore::new());
        let alice = service
            .create_user(sign_up("alice", None), Role::User)
            .await
            .expect("create must succeed");
        service
            .create_user(sign_up("bob", None), Role::User)
            .await
            .expect("create must succeed");

        let updated = service
            .update_user(
                alice.id,
                UpdateUserRequest {
                    email: " Alice@New.example ".to_string(),
                    first_name: Some("Alice".to_string()),
                    last_name: Some("Liddell".to_string()),
                    role: None,
                    is_active: None,
                },
            )
            .await
            .expect("update must succeed");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.email, "alice@new.example");
        assert_eq!(updated.last_name.as_deref(), Some("Liddell"));
        assert_eq!(updated.role, Role::User);

        let err = service
            .update_user(
                alice.id,
                UpdateUserRequest {
                    email: "bob@example.com".to_string(),
                    first_name: None,
                    last_name: None,
                    role: None,
                    is_active: None,
                },
            )
            .await
            .expect_err("taken email must conflict");
        assert!(matches!(err, DomainError::Conflict("email")));
    }

    #[tokio::test]
    async fn deactivate_and_activate_flip_flag() {
        let service = UserService::new(InMemoryStore::new());
        let user = service
            .create_user(sign_up("alice", None), Role::User)
            .await
            .expect("create must succeed");

        let off = service.deactivate(user.id).await.expect("must deactivate");
        assert!(!off.is_active);
        let off_again = service.deactivate(user.id).await.expect("no-op succeeds");
        assert!(!off_again.is_active);

        let on = service.activate(user.id).await.expect("must activate");
        assert!(on.is_active);

        assert!(matches!(
            service.activate(999).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn search_matches_names_case_insensitively() {
        let service = UserService::new(InMemoryStore::new());
        service
            .create_user(sign_up("alice", Some("Wonder")), Role::User)
            .await
            .expect("create must succeed");
        service
            .create_user(sign_up("bob", None), Role::User)
            .await
            .expect("create must succeed");

        let by_first_name = service
            .search_users("wONDER", by_id())
            .await
            .expect("search must succeed");
        assert_eq!(by_first_name.total, 1);
        assert_eq!(by_first_name.items[0].username, "alice");

        let by_username = service
            .search_users("BO", by_id())
            .await
            .expect("search must succeed");
        assert_eq!(by_username.items.len(), 1);

        assert!(matches!(
            service.search_users("   ", by_id()).await,
            Err(DomainError::Validation { field: "name", .. })
        ));
    }

    #[tokio::test]
    async fn list_pages_and_rejects_foreign_sort_field() {
        let service = UserService::new(InMemoryStore::new());
        for name in ["ann", "ben", "cid"] {
            service
                .create_user(sign_up(name, None), Role::User)
                .await
                .expect("create must succeed");
        }

        let page = service
            .list_users(PageRequest::new(
                1,
                2,
                Sort::new(SortField::Username, SortDirection::Desc),
            ))
            .await
            .expect("list must succeed");
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].username, "ann");

        assert!(
            service
                .list_users(PageRequest::new(0, 10, Sort::newest_first()))
                .await
                .is_ok()
        );

        let err = service
            .list_users(PageRequest::new(
                0,
                10,
                Sort::new(SortField::Title, SortDirection::Asc),
            ))
            .await
            .expect_err("title is not a user field");
        assert!(matches!(err, DomainError::Validation { field: "sortBy", .. }));
    }

    #[tokio::test]
    async fn active_by_role_skips_inactive_accounts() {
        let service = UserService::new(InMemoryStore::new());
        let a = service
            .create_user(sign_up("admin1", None), Role::Admin)
            .await
            .expect("create must succeed");
        let b = service
            .create_user(sign_up("admin2", None), Role::Admin)
            .await
            .expect("create must succeed");
        service
            .create_user(sign_up("plain", None), Role::User)
            .await
            .expect("create must succeed");
        service.deactivate(b.id).await.expect("must deactivate");

        let admins = service
            .list_active_by_role(Role::Admin)
            .await
            .expect("list must succeed");
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, a.id);
    }

    #[tokio::test]
    async fn delete_removes_user_once() {
        let service = UserService::new(InMemoryStore::new());
        let user = service
            .create_user(sign_up("alice", None), Role::User)
            .await
            .expect("create must succeed");

        service.delete_user(user.id).await.expect("delete must succeed");
        assert!(matches!(
            service.delete_user(user.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
