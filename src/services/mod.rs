//! Business logic services layer

pub mod auth_service;
pub mod work_service;

pub use auth_service::AuthService;
pub use work_service::WorkService;
