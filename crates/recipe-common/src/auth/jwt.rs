//! Bearer-token handling.
//!
//! Token issuance lives in the (out-of-scope) login flow; inside this
//! system the service is consumed at the WebSocket handshake, where the
//! client presents its token as a connection parameter. Claims carry the
//! user id as the subject and the role as a custom claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use recipe_core::UserRole;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified
    pub sub: String,
    /// Role name (`user`, `admin`, `common_admin`)
    pub role: String,
    /// Issued-at, epoch seconds
    pub iat: i64,
    /// Expiry, epoch seconds
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id
    ///
    /// # Errors
    /// Returns `InvalidToken` when the subject is not numeric.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Parse the role claim
    ///
    /// # Errors
    /// Returns `InvalidToken` when the claim names an unknown role.
    pub fn user_role(&self) -> Result<UserRole, AppError> {
        self.role.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Whether the expiry has passed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Issues and validates bearer tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    /// Build a service around a shared HMAC secret; `token_expiry` is the
    /// issued-token lifetime in seconds
    #[must_use]
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    /// Decode a presented token and verify signature and expiry.
    ///
    /// A leading `Bearer ` prefix is tolerated, since some clients forward
    /// the whole Authorization header value.
    ///
    /// # Errors
    /// `TokenExpired` for an outdated token, `InvalidToken` otherwise.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let raw = token.strip_prefix("Bearer ").unwrap_or(token);

        decode::<Claims>(raw, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }

    /// Issue a signed token for a user
    ///
    /// # Errors
    /// Fails only when the claims cannot be encoded.
    pub fn issue_token(&self, user_id: i64, role: UserRole) -> Result<String, AppError> {
        let issued_at = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(self.token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("token encoding failed: {e}")))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}
