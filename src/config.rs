//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// 服务自身约定的环境变量，映射到嵌套配置键
const SERVICE_ENV_KEYS: &[(&str, &str)] = &[
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_DATABASE", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("SIGNING_SECRET", "security.signing_secret"),
];

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ServiceEnv {
    Development,
    Staging,
    Production,
}

impl ServiceEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceEnv::Development => "development",
            ServiceEnv::Staging => "staging",
            ServiceEnv::Production => "production",
        }
    }

    /// staging 环境默认打开 debug 日志
    pub fn default_log_level(&self) -> &'static str {
        match self {
            ServiceEnv::Staging => "debug",
            ServiceEnv::Development | ServiceEnv::Production => "info",
        }
    }
}

impl FromStr for ServiceEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(ServiceEnv::Development),
            "staging" => Ok(ServiceEnv::Staging),
            "production" | "prod" => Ok(ServiceEnv::Production),
            other => Err(ConfigError::Message(format!(
                "Invalid SERVICE_ENV: {}. Must be one of: development, staging, production",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ServiceEnv {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ServiceEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 请求体大小上限（字节）
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    /// 数据库名
    pub name: String,
    pub user: String,
    /// 数据库密码（使用 Secret 包装，防止日志泄露）
    pub password: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// 令牌签名密钥（使用 Secret 包装，防止日志泄露）
    pub signing_secret: Secret<String>,
    /// 令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// Argon2 内存开销（KiB）
    pub argon2_memory_kib: u32,
    /// Argon2 迭代次数
    pub argon2_iterations: u32,
    /// Argon2 并行度
    pub argon2_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: ServiceEnv,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment: ServiceEnv = match std::env::var("SERVICE_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => ServiceEnv::Development,
        };

        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("environment", environment.as_str())?
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.body_limit_bytes", 64 * 1024)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "postgres")?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", environment.default_log_level())?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 3600)?
            .set_default("security.argon2_memory_kib", argon2::Params::DEFAULT_M_COST)?
            .set_default("security.argon2_iterations", argon2::Params::DEFAULT_T_COST)?
            .set_default("security.argon2_parallelism", argon2::Params::DEFAULT_P_COST)?;

        // 嵌套覆盖（前缀为 APP_，例如 APP_SERVER__ADDR）
        settings = settings.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 服务约定的环境变量优先级最高
        for (var, key) in SERVICE_ENV_KEYS {
            settings = settings.set_override_option(*key, std::env::var(var).ok())?;
        }

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 签名密钥没有默认值，且至少 32 字节
        if self.security.signing_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "Signing secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.security.token_ttl_secs < 60 || self.security.token_ttl_secs > 86400 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be between 60 and 86400 (1 minute to 24 hours)".to_string(),
            ));
        }

        Ok(())
    }
}
