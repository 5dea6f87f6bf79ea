//! 服务骨架库
//! 注册、登录、用户查询、版本与工作提交，以及认证和请求分发管线

pub mod auth;
pub mod chain;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod server;
pub mod services;
pub mod telemetry;
