pub mod auth_service;
pub mod password_hasher;
pub mod token_service;

pub use auth_service::AuthService;
pub use password_hasher::PasswordHasher;
pub use token_service::TokenService;
