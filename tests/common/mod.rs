//! 测试公共模块
//! 提供测试配置、内存用户存储和请求辅助函数

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use skeleton_service::{
    auth::password::HashedCredential,
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, ServiceEnv},
    error::AppError,
    middleware::AppState,
    models::{user::Identity, version::Version},
    repository::UserDirectory,
    routes, server,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-signing-secret-for-testing-only-32+";

/// 创建测试配置（最低成本的 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        environment: ServiceEnv::Development,
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
            body_limit_bytes: 64 * 1024,
        },
        database: DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            name: "skeleton_test".to_string(),
            user: "postgres".to_string(),
            password: Secret::new("postgres".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            signing_secret: Secret::new(TEST_SECRET.to_string()),
            token_ttl_secs: 300,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        },
    }
}

#[derive(Clone)]
struct StoredUser {
    identity: Identity,
    password_hash: HashedCredential,
}

/// 内存用户存储，记录写入次数
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<Uuid, StoredUser>>,
    writes: AtomicUsize,
    unavailable: bool,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有操作都失败的存储，用于就绪检查和 500 路径
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored_hash(&self, username: &str) -> Option<HashedCredential> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.identity.username == username)
            .map(|u| u.password_hash.clone())
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_version(&self) -> Result<Version, AppError> {
        self.check_available()?;
        Ok(Version::from_schema(1))
    }

    async fn create_user(
        &self,
        identity: &Identity,
        password_hash: &HashedCredential,
    ) -> Result<(), AppError> {
        self.check_available()?;
        let mut users = self.users.lock().unwrap();

        if users.values().any(|u| u.identity.username == identity.username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                identity.username
            )));
        }

        users.insert(
            identity.id,
            StoredUser {
                identity: identity.clone(),
                password_hash: password_hash.clone(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&id)
            .map(|u| u.identity.clone()))
    }

    async fn find_user_and_password_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(Identity, HashedCredential)>, AppError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.identity.username == username)
            .map(|u| (u.identity.clone(), u.password_hash.clone())))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

/// 基于给定存储构建应用状态
pub fn create_test_app_state(directory: Arc<InMemoryUserDirectory>) -> Arc<AppState> {
    Arc::new(server::build_state(create_test_config(), directory).unwrap())
}

/// 构建测试路由，同时返回存储以便断言
pub fn create_test_app() -> (Router, Arc<InMemoryUserDirectory>) {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let app = routes::create_router(create_test_app_state(directory.clone()));
    (app, directory)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// 注册一个用户并返回其 id
pub async fn signup(app: &Router, username: &str, password: &str, role: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/signup",
            serde_json::json!({ "username": username, "password": password, "role": role }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// 登录并返回令牌
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/login",
            serde_json::json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
