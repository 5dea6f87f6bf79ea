//! 服务主入口

use skeleton_service::{config::AppConfig, handlers::health, server::Application, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("skeleton-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(env) = std::env::var("SERVICE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
    }
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.environment.as_str(),
        "skeleton-service starting..."
    );

    // 3. 连接池、迁移、绑定端口
    let app = Application::build(config).await?;

    // 4. 服务直到收到关闭信号
    app.run_until_stopped().await?;

    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("skeleton-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: skeleton-service [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  SERVICE_ENV       development | staging | production");
    println!("  DB_HOST, DB_PORT, DB_DATABASE, DB_USER, DB_PASSWORD");
    println!("  SIGNING_SECRET    令牌签名密钥（至少 32 字节）");
    println!("  APP_<SECTION>__<KEY> 覆盖任意配置项，例如 APP_SERVER__ADDR");
}
