//! Authentication Service
//!
//! Verifies bearer credentials issued by the identity provider. Token
//! issuance lives elsewhere; this service only checks signatures and claims.
//! The same verifier backs the HTTP auth middleware and the gateway handshake.

use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::UserRole;

/// Verified caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// Credential verification seam
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer token and return the identity it carries.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// HS256 JWT verifier
pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::default();
        validation.leeway = settings.leeway_secs;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Identity {
            user_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "an-adequately-long-test-secret-value-0123";

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.into(),
            issuer: None,
            leeway_secs: 0,
        }
    }

    fn token(sub: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.into(),
            role: UserRole::Employer,
            exp: now + exp_offset,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user_id = Uuid::new_v4();
        let verifier = JwtTokenVerifier::new(&settings());
        let identity = verifier.verify(&token(&user_id.to_string(), 600)).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, UserRole::Employer);
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtTokenVerifier::new(&settings());
        let result = verifier.verify(&token(&Uuid::new_v4().to_string(), -600));
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let verifier = JwtTokenVerifier::new(&settings());
        assert_eq!(verifier.verify(&token("42", 600)), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_empty_and_garbage_tokens() {
        let verifier = JwtTokenVerifier::new(&settings());
        assert_eq!(verifier.verify(""), Err(AuthError::MissingToken));
        assert_eq!(verifier.verify("not.a.jwt"), Err(AuthError::InvalidToken));
    }
}
