use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{AuthError, AuthUser, TokenVerifier};
use crate::error::AppError;

/// State handed to the auth middleware
pub type VerifierState = Arc<dyn TokenVerifier>;

/// Middleware validating `Authorization: Bearer <token>` headers.
///
/// A valid token injects [`AuthUser`] into the request extensions; a
/// present-but-invalid token is rejected with 401 before any handler
/// runs. Requests without a token pass through unauthenticated, and the
/// [`CurrentUser`] extractor rejects them on protected routes.
pub async fn auth_middleware(
    State(verifier): State<VerifierState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match verifier.verify(token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            Err(e) => {
                let message = match e {
                    AuthError::TokenExpired => "Token expired",
                    AuthError::InvalidToken => "Invalid token",
                };
                AppError::Unauthorized(message.to_string()).into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor requiring an authenticated caller.
///
/// Yields 401 when the auth middleware injected no identity.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn test_user() -> AuthUser {
        AuthUser {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_current_user_extracts_from_extensions() {
        let mut request: Request<()> = Request::builder().uri("/profiles").body(()).unwrap();
        request.extensions_mut().insert(test_user());
        let (mut parts, _) = request.into_parts();

        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_current_user_rejects_unauthenticated() {
        let request: Request<()> = Request::builder().uri("/profiles").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_bearer_prefix_extraction() {
        assert_eq!("Bearer abc".strip_prefix("Bearer "), Some("abc"));
        assert_eq!("abc".strip_prefix("Bearer "), None);
        assert_eq!("Basic abc".strip_prefix("Bearer "), None);
    }
}
