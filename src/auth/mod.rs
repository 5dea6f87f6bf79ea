//! Authentication module: credential hashing, bearer tokens and the auth gate

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{authenticate, extract_token, AuthContext};
pub use password::{HashedCredential, PasswordHasher};
