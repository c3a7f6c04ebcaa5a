use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{Role, SignInRequest, SignUpRequest, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::PasswordHasher;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl<R: UserRepository> AuthService<R> {
    pub(crate) fn new(repo: R, jwt: Arc<JwtService>) -> Self {
        Self {
            repo,
            jwt,
            hasher: PasswordHasher,
        }
    }

    /// Registers a USER account. No token is issued; the caller signs in
    /// separately.
    pub(crate) async fn sign_up(&self, req: SignUpRequest) -> Result<User, DomainError> {
        let req = req.validate()?;
        let user = register(&self.repo, &self.hasher, req, Role::User).await?;

        info!(user_id = user.id, username = %user.username, "user signed up");
        Ok(user)
    }

    pub(crate) async fn sign_in(&self, req: SignInRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep the timing of an unknown username close to a wrong password
                match self
                    .hasher
                    .verify(&req.password, PasswordHasher::DUMMY_PASSWORD_HASH)
                {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                warn!("sign-in rejected: unknown username");
                return Err(DomainError::InvalidCredentials);
            }
        };

        if let Err(err) = self.hasher.verify(&req.password, &user_creds.password_hash) {
            warn!(user_id = user_creds.user.id, "sign-in rejected: bad password");
            return Err(err);
        }

        if !user_creds.user.is_active {
            warn!(user_id = user_creds.user.id, "sign-in rejected: account deactivated");
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self
            .jwt
            .issue_for(&user_creds.user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        info!(user_id = user_creds.user.id, "user signed in");
        Ok(AuthResult {
            user: user_creds.user,
            access_token,
        })
    }

    /// Resolves a bearer token to the stored user it names. `None` when the
    /// token does not verify or its subject no longer exists.
    pub(crate) async fn authenticate(&self, token: &str) -> Result<Option<User>, DomainError> {
        let subject = match self.jwt.parse_subject(token) {
            Ok(subject) => subject,
            Err(err) => {
                warn!(error = %err, "bearer token rejected");
                return Ok(None);
            }
        };

        let user = self.repo.find_by_username(&subject).await?;
        if user.is_none() {
            debug!(subject = %subject, "token subject has no account");
        }
        Ok(user.map(|creds| creds.user))
    }

    /// Creates the configured admin account unless the username is taken.
    pub(crate) async fn bootstrap_admin(
        &self,
        req: SignUpRequest,
    ) -> Result<Option<User>, DomainError> {
        let req = req.validate()?;
        if self.repo.find_by_username(&req.username).await?.is_some() {
            return Ok(None);
        }

        let user = register(&self.repo, &self.hasher, req, Role::Admin).await?;
        info!(user_id = user.id, username = %user.username, "admin account bootstrapped");
        Ok(Some(user))
    }
}

/// Uniqueness checks, hashing and insert shared by every account-creating path.
/// The unique constraints still back the checks up under concurrent sign-ups.
pub(crate) async fn register<R: UserRepository>(
    repo: &R,
    hasher: &PasswordHasher,
    req: SignUpRequest,
    role: Role,
) -> Result<User, DomainError> {
    if repo.find_by_username(&req.username).await?.is_some() {
        return Err(DomainError::Conflict("username"));
    }
    if repo.find_by_email(&req.email).await?.is_some() {
        return Err(DomainError::Conflict("email"));
    }

    let password_hash = hasher.hash(&req.password)?;
    repo.create_user(NewUser {
        username: req.username,
        email: req.email,
        password_hash,
        first_name: req.first_name,
        last_name: req.last_name,
        role,
        is_active: true,
    })
    .await
}
