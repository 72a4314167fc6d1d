use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clipvault_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Caller identity resolved by the auth middleware and stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing auth context".to_string())))
    }
}
