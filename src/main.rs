//! 产品 CRUD 服务入口

use products_crud::{
    config::load_config,
    create_routes,
    infrastructure::{open_store, Logger},
    AppState, ProductService,
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // guard 需要在整个进程生命周期内保持
    let _log_guard = Logger::init(&config.logging)?;

    info!("启动产品 CRUD 服务...");

    let store = open_store(&config.database).await.map_err(|e| {
        error!("初始化存储失败: {}", e);
        e
    })?;

    let state = AppState {
        product_service: ProductService::new(store),
    };
    let app = create_routes(state, config.http.timeout());

    let listener = TcpListener::bind(config.http.listen_addr()).await?;
    let addr = listener.local_addr()?;

    info!("🚀 服务器运行在 http://{}", addr);
    info!("📖 API 端点:");
    info!("   GET    /              - 问候信息");
    info!("   GET    /health        - 健康检查");
    info!("   GET    /products      - 获取全部产品");
    info!("   POST   /products      - 创建产品");
    info!("   GET    /products/:id  - 获取指定产品");
    info!("   PUT    /products/:id  - 更新产品");
    info!("   DELETE /products/:id  - 删除产品");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务器已安全关闭");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("无法监听 Ctrl+C: {}", e);
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
                warn!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到停止信号，正在关闭服务器...");
}
