use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity extracted from a validated bearer token.
///
/// Carries only the claims the handlers actually use; the full account
/// row lives in the store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// Token verification failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,
}

/// Port for bearer-token verification.
///
/// Token issuance belongs to the auth collaborator; this side only
/// checks signatures and expiry. The middleware stays provider-agnostic
/// behind this trait.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Claims carried by the HS256 access tokens
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    username: String,
    exp: i64,
}

/// Verifies HS256-signed JWTs against a shared secret
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for the given identity, expiring at the given unix time.
    ///
    /// Production tokens come from the auth collaborator; this exists for
    /// local development and the verifier's own tests.
    pub fn sign(&self, user: &AuthUser, expires_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            exp: expires_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(AuthUser {
            id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

/// Verifier backed by a fixed token → identity table.
///
/// Used in tests and local development where no auth collaborator is
/// running; unknown tokens are rejected.
#[derive(Default)]
pub struct StaticTokenVerifier {
    users: HashMap<String, AuthUser>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthUser) -> Self {
        self.users.insert(token.into(), user);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.users.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

/// Hex SHA-256 digest for stored passwords
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> AuthUser {
        AuthUser {
            id: 7,
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_jwt_sign_and_verify_round_trip() {
        let verifier = JwtVerifier::new("test-secret");
        let expires_at = chrono::Utc::now().timestamp() + 3600;
        let token = verifier.sign(&test_user(), expires_at).unwrap();

        let user = verifier.verify(&token).await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_jwt_expired_token_is_rejected() {
        let verifier = JwtVerifier::new("test-secret");
        // Well past the default validation leeway
        let expires_at = chrono::Utc::now().timestamp() - 3600;
        let token = verifier.sign(&test_user(), expires_at).unwrap();

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_jwt_wrong_secret_is_invalid() {
        let signer = JwtVerifier::new("secret-a");
        let verifier = JwtVerifier::new("secret-b");
        let expires_at = chrono::Utc::now().timestamp() + 3600;
        let token = signer.sign(&test_user(), expires_at).unwrap();

        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_static_verifier_known_and_unknown_tokens() {
        let verifier = StaticTokenVerifier::new().with_user("tok", test_user());

        assert_eq!(verifier.verify("tok").await.unwrap().username, "alice");
        assert!(matches!(
            verifier.verify("other").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_password_digest_is_stable_hex() {
        let digest = password_digest("p1");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, password_digest("p1"));
        assert_ne!(digest, password_digest("p2"));
    }
}
