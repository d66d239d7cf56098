mod bcrypt_password_hasher;
mod jwt_token_service;

pub use bcrypt_password_hasher::BcryptPasswordHasher;
pub use jwt_token_service::{Claims, JwtTokenService};
