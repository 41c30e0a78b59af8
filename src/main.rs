//! 会话网关主入口

use session_gate::{
    config::{AppConfig, StorageBackend},
    db,
    handlers::health,
    middleware::AppState,
    repository::{
        MemoryStore, SessionRepository, SessionStore, UserDirectory, UserRepository,
    },
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("session-gate {}", env!("CARGO_PKG_VERSION"));
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

    // 生产环境直接设置环境变量，不依赖 .env 文件
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "session-gate starting...");

    // 3. 选择存储后端
    let db_pool: Option<sqlx::PgPool>;
    let users: Arc<dyn UserDirectory>;
    let sessions: Arc<dyn SessionStore>;

    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Database initialized");

            users = Arc::new(UserRepository::new(pool.clone()));
            sessions = Arc::new(SessionRepository::new(pool.clone()));
            db_pool = Some(pool);
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            users = store.clone();
            sessions = store;
            db_pool = None;
        }
    }

    // 4. 构建应用状态与路由
    let app_state = Arc::new(AppState::new(config.clone(), db_pool, users, sessions)?);
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
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
            Ok(mut sig) => {
                sig.recv().await;
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

fn print_help() {
    println!("session-gate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: session-gate [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量（前缀 SESSION_GATE_，层级分隔符 __）:");
    println!("  SESSION_GATE_SERVER__ADDR           监听地址（默认 0.0.0.0:3000）");
    println!("  SESSION_GATE_STORAGE__BACKEND       postgres | memory");
    println!("  SESSION_GATE_DATABASE__URL          PostgreSQL 连接 URL");
    println!("  SESSION_GATE_SECURITY__JWT_SECRET   令牌签名密钥（至少 32 字符）");
    println!("  SESSION_GATE_SECURITY__COOKIE_SECURE  Cookie 是否附带 Secure");
    println!("  SESSION_GATE_LOGGING__LEVEL         trace | debug | info | warn | error");
    println!("  SESSION_GATE_LOGGING__FORMAT        json | pretty | compact");
}
