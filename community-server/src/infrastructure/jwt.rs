use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::User;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token signature or claims are invalid")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("token is malformed")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

impl JwtError {
    fn from_decode(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::Malformed(err),
            _ => JwtError::Invalid(err),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Stateless HS256 bearer tokens. There is no revocation list: a token stays
/// usable until `exp`, whatever happens to its subject meanwhile.
pub(crate) struct JwtService {
    secret: String,
    ttl: Duration,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Token for `subject` that expires at `now + ttl`.
    pub(crate) fn issue(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    /// Token for an authenticated user with the configured ttl.
    pub(crate) fn issue_for(&self, user: &User) -> Result<String, JwtError> {
        self.issue(&user.username, self.ttl)
    }

    pub(crate) fn parse_subject(&self, token: &str) -> Result<String, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::from_decode)?;

        Ok(token_data.claims.sub)
    }

    /// Boolean form of [`Self::parse_subject`].
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn validate(&self, token: &str) -> bool {
        match self.parse_subject(token) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "token rejected");
                false
            }
        }
    }
}
