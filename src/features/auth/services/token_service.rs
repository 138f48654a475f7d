use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::TokenResponseDto;
use crate::features::auth::models::{AuthenticatedUser, User};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates HS256 access tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    leeway: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.access_token_ttl.as_secs() as i64,
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<TokenResponseDto> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))?;

        Ok(TokenResponseDto {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.ttl_secs,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {}", e);
                AppError::Unauthorized("Could not validate credentials".to_string())
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
        })
    }
}
