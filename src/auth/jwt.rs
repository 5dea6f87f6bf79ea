//! Bearer token issuance and validation.
//! Tokens are HS512 JWTs binding the user id and role; nothing is stored server side.

use crate::{
    config::SecurityConfig,
    error::AppError,
    models::{role::Role, user::Identity},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The only algorithm tokens are signed and accepted with
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,

    /// User role
    pub role: Role,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: Uuid,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret too short (min {MIN_SECRET_LEN} bytes)")]
    WeakSecret,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token algorithm is not accepted")]
    AlgorithmMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token claims are invalid")]
    InvalidClaims,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::AlgorithmMismatch
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                TokenError::Malformed
            }
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) | ErrorKind::ImmatureSignature => {
                TokenError::InvalidClaims
            }
            _ => TokenError::Malformed,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::WeakSecret => AppError::Config(e.to_string()),
            TokenError::Signing(_) => AppError::Internal(e.to_string()),
            _ => AppError::Forbidden,
        }
    }
}

/// Token service holding the process-wide signing key
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &Secret<String>, ttl_secs: u64) -> Result<Self, TokenError> {
        let secret = secret.expose_secret();

        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        })
    }

    /// Create token service from config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.signing_secret, config.token_ttl_secs)?)
    }

    /// Issue a signed token for the given identity
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.ttl_secs as i64);

        let claims = Claims {
            sub: identity.id,
            role: identity.role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            TokenError::Signing(e.to_string())
        })
    }

    /// Validate signature, algorithm and expiry, then decode the claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = TokenError::from(e);
                tracing::debug!(reason = %err, "Token validation failed");
                err
            })
    }
}
