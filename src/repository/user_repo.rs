//! User repository (数据库访问层)

use crate::{
    auth::password::HashedCredential,
    db,
    error::AppError,
    models::{role::Role, user::Identity, version::Version},
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// 用户目录：认证流程依赖的持久化接口
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 当前 schema 版本
    async fn find_version(&self) -> Result<Version, AppError>;

    /// 创建用户；用户名重复时返回 `AppError::Conflict`
    async fn create_user(
        &self,
        identity: &Identity,
        password_hash: &HashedCredential,
    ) -> Result<(), AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<Identity>, AppError>;

    async fn find_user_and_password_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(Identity, HashedCredential)>, AppError>;

    /// 就绪检查
    async fn ping(&self) -> Result<(), AppError>;
}

pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 存储中的角色名必须落在封闭集合内
fn parse_stored_role(name: &str) -> Result<Role, AppError> {
    name.parse().map_err(|e| {
        tracing::error!(role = %name, "Stored role is outside the known set");
        AppError::Internal(format!("corrupt role in storage: {}", e))
    })
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_version(&self) -> Result<Version, AppError> {
        let applied: i64 = sqlx::query(
            "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
        )
        .fetch_one(&self.db)
        .await?
        .try_get(0)?;

        Ok(Version::from_schema(applied))
    }

    async fn create_user(
        &self,
        identity: &Identity,
        password_hash: &HashedCredential,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (uuid, username, password_hash, role_id)
            VALUES ($1, $2, $3, (SELECT id FROM roles WHERE name = $4))
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(password_hash.as_str())
        .bind(identity.role.as_str())
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &result {
            if db_err.is_unique_violation() {
                return Err(AppError::Conflict(format!(
                    "username already exists: {}",
                    identity.username
                )));
            }
        }
        result?;

        // 未提交的事务在 drop 时自动回滚
        tx.commit().await?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT u.username, r.name AS role
            FROM users AS u
            JOIN roles AS r ON u.role_id = r.id
            WHERE u.uuid = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(|row| -> Result<Identity, AppError> {
            let role: String = row.try_get("role")?;
            Ok(Identity {
                id,
                username: row.try_get("username")?,
                role: parse_stored_role(&role)?,
            })
        })
        .transpose()
    }

    async fn find_user_and_password_by_username(
        &self,
        username: &str,
    ) -> Result<Option<(Identity, HashedCredential)>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT u.uuid, u.password_hash, r.name AS role
            FROM users AS u
            JOIN roles AS r ON u.role_id = r.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        row.map(|row| -> Result<(Identity, HashedCredential), AppError> {
            let role: String = row.try_get("role")?;
            let identity = Identity {
                id: row.try_get("uuid")?,
                username: username.to_string(),
                role: parse_stored_role(&role)?,
            };
            let hash = HashedCredential::from_stored(row.try_get("password_hash")?);
            Ok((identity, hash))
        })
        .transpose()
    }

    async fn ping(&self) -> Result<(), AppError> {
        match db::health_check(&self.db).await {
            db::HealthStatus::Healthy => Ok(()),
            db::HealthStatus::Unhealthy(msg) => Err(AppError::Internal(msg)),
        }
    }
}
