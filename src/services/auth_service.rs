//! 认证服务：注册、登录、用户查询

use crate::{
    auth::{
        jwt::TokenService,
        password::{HashedCredential, PasswordHasher},
    },
    error::AppError,
    models::{role::Role, user::Identity, version::Version},
    repository::UserDirectory,
};
use std::sync::Arc;
use uuid::Uuid;

/// 用户不存在时用于校验的占位口令
const DUMMY_SECRET: &str = "unknown-user-placeholder";

pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    token_service: Arc<TokenService>,
    hasher: PasswordHasher,
    /// 与真实凭证同参数的哈希，用户不存在时也付出一次完整的校验开销
    dummy_hash: HashedCredential,
}

impl AuthService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        token_service: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;

        Ok(Self {
            directory,
            token_service,
            hasher,
            dummy_hash,
        })
    }

    /// 用户注册
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<Identity, AppError> {
        // 角色必须先通过校验，否则不做任何写入
        let role: Role = role.parse()?;

        let identity = Identity {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        };

        let hasher = self.hasher.clone();
        let secret = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        self.directory.create_user(&identity, &password_hash).await?;

        tracing::info!(user_id = %identity.id, role = %identity.role, "User signed up");

        Ok(identity)
    }

    /// 用户登录，成功时返回签名令牌
    ///
    /// 用户不存在与密码错误返回同一个错误，避免用户名枚举。
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let Some((identity, password_hash)) = self
            .directory
            .find_user_and_password_by_username(username)
            .await?
        else {
            self.verify_blocking(password, self.dummy_hash.clone()).await;
            tracing::info!("Login failed: unknown username");
            return Err(AppError::Unauthorized);
        };

        if !self.verify_blocking(password, password_hash).await {
            tracing::info!(user_id = %identity.id, "Login failed: credential mismatch");
            return Err(AppError::Unauthorized);
        }

        let token = self.token_service.issue(&identity)?;

        tracing::info!(user_id = %identity.id, "User logged in");

        Ok(token)
    }

    /// 在阻塞线程池中校验口令；任务异常按不匹配处理
    async fn verify_blocking(&self, password: &str, password_hash: HashedCredential) -> bool {
        let hasher = self.hasher.clone();
        let secret = password.to_string();

        match tokio::task::spawn_blocking(move || hasher.verify(&secret, &password_hash)).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// 根据 ID 查询用户
    pub async fn find_user(&self, id: Uuid) -> Result<Identity, AppError> {
        self.directory
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    /// 当前数据模式版本
    pub async fn version(&self) -> Result<Version, AppError> {
        self.directory.find_version().await
    }
}
