//! Bearer-token authentication
//!
//! The upload routes only need to know *who* is calling. Token verification sits
//! behind [`Authenticator`] so the JWT implementation can be swapped in tests.

pub mod jwt;
pub mod middleware;
pub mod models;

use async_trait::async_trait;
use clipvault_core::AppError;
use uuid::Uuid;

pub use jwt::{Claims, JwtAuthenticator};
pub use middleware::{auth_middleware, AuthState};
pub use models::AuthContext;

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Invalid authorization header format. Expected: Bearer <token>")]
    MalformedHeader,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to issue token: {0}")]
    Issue(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Resolves a bearer credential to the identity of the caller.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn resolve_identity(&self, credential: &str) -> Result<Uuid, AuthError>;
}
