use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, TokenResponseDto, UserResponseDto,
};
use crate::features::auth::models::AuthenticatedUser;
use crate::features::auth::repositories::UserRepository;
use crate::features::auth::services::{PasswordHasher, TokenService};

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

/// Service for account operations (register, login, current user)
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserResponseDto> {
        let email = Self::normalize_email(&dto.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash(&dto.password)?;
        let user = self.users.create(&email, &password_hash).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenResponseDto> {
        let email = Self::normalize_email(&dto.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|user| self.hasher.verify(&dto.password, &user.password_hash))
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        self.tokens.issue_token(&user)
    }

    pub async fn current_user(&self, caller: &AuthenticatedUser) -> Result<UserResponseDto> {
        self.users
            .find_by_id(caller.user_id)
            .await?
            .map(UserResponseDto::from)
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))
    }
}
