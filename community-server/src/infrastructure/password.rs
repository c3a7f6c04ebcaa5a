use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
        SaltString, rand_core::OsRng,
    },
};

use crate::domain::error::DomainError;

/// Argon2id hashing shared by sign-up, admin user creation and sign-in.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PasswordHasher;

impl PasswordHasher {
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password.
    pub(crate) const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn hash(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify(&self, raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordHasher;
    use crate::domain::error::DomainError;

    #[test]
    fn hash_then_verify_accepts_only_the_original_password() {
        let hasher = PasswordHasher;
        let hash = hasher.hash("secret123").expect("hash must be created");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("secret123", &hash).is_ok());
        assert!(matches!(
            hasher.verify("secret124", &hash),
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[test]
    fn dummy_hash_is_parseable() {
        let err = PasswordHasher
            .verify("anything", PasswordHasher::DUMMY_PASSWORD_HASH)
            .expect_err("dummy hash must not match");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }
}
