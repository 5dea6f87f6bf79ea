//! 应用组装与生命周期
//! 启动顺序：连接池 → 迁移 → 状态与路由 → 绑定监听端口

use axum::Router;
use sqlx::PgPool;
use std::{future::IntoFuture, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal, sync::watch};

use crate::{
    auth::{jwt::TokenService, password::PasswordHasher},
    config::AppConfig,
    db,
    error::AppError,
    middleware::AppState,
    repository::{PgUserDirectory, UserDirectory},
    routes,
    services::{AuthService, WorkService},
};

/// 由配置和用户存储构建共享状态
pub fn build_state(
    config: AppConfig,
    directory: Arc<dyn UserDirectory>,
) -> Result<AppState, AppError> {
    let token_service = Arc::new(TokenService::from_config(&config.security)?);
    let hasher = PasswordHasher::from_config(&config.security)?;

    let auth_service = Arc::new(AuthService::new(
        directory.clone(),
        token_service.clone(),
        hasher,
    )?);

    Ok(AppState {
        config,
        directory,
        token_service,
        auth_service,
        work_service: WorkService::new(),
    })
}

/// 已绑定端口、尚未开始服务的应用
pub struct Application {
    listener: TcpListener,
    router: Router,
    pool: PgPool,
    shutdown_timeout: Duration,
}

impl Application {
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;

        tracing::info!("Database initialized");

        let directory: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pool.clone()));
        let shutdown_timeout = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);
        let addr = config.server.addr.clone();

        let state = Arc::new(build_state(config, directory)?);
        let router = routes::create_router(state);

        // 迁移完成之后才开始接受连接
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Config(format!("failed to bind {}: {}", addr, e)))?;

        Ok(Self {
            listener,
            router,
            pool,
            shutdown_timeout,
        })
    }

    /// 运行直到收到 SIGINT/SIGTERM，排空在途请求后关闭连接池
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        let Self {
            listener,
            router,
            pool,
            shutdown_timeout,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, "Server listening");
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);

        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = stop_tx.send(true);
            })
            .into_future();

        let drain_deadline = async move {
            if stop_rx.wait_for(|stopped| *stopped).await.is_err() {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(shutdown_timeout).await;
        };

        tokio::select! {
            result = server => {
                result.map_err(|e| AppError::Internal(format!("server error: {}", e)))?;
            }
            _ = drain_deadline => {
                tracing::warn!("Graceful shutdown timeout reached, forcing exit");
            }
        }

        pool.close().await;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}
