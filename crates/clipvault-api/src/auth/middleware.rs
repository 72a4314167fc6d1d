use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clipvault_core::AppError;

use super::{AuthContext, AuthError, Authenticator};
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
}

fn reject(err: AuthError) -> Response {
    HttpAppError(AppError::from(err)).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return reject(AuthError::MissingCredential),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return reject(AuthError::MalformedHeader),
    };

    let user_id = match auth_state.authenticator.resolve_identity(token).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "Authentication failed");
            return reject(e);
        }
    };

    request.extensions_mut().insert(AuthContext { user_id });

    next.run(request).await
}
