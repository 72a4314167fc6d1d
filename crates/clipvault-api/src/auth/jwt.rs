use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, Authenticator};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// HS256 bearer tokens signed with a shared secret.
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer,
        }
    }

    /// Sign a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iss: self.issuer.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn resolve_identity(&self, credential: &str) -> Result<Uuid, AuthError> {
        self.validate_token(credential).map(|claims| claims.sub)
    }
}
