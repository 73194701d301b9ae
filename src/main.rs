use catalog::app::{self, product::service::ProductService, AppState};
use catalog::config;
use catalog::infrastructure::logger::Logger;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config()?;

    // 初始化日志
    Logger::init(&config.logging.level);

    info!("启动产品目录服务...");

    let store = app::open_store(&config.database).await?;
    let product_service = ProductService::new(store).with_rules(config.validation.rules);
    info!("校验规则: {:?}", product_service.rules());

    let app = app::build_app(AppState::new(product_service), &config.http);

    let address = config.http.address();
    let listener = TcpListener::bind(&address).await?;

    info!("🚀 产品目录服务运行在 http://{}", address);
    info!("📖 API 端点:");
    info!("   GET    /products                  - 获取所有产品");
    info!("   POST   /products                  - 创建产品");
    info!("   GET    /products/:id              - 获取特定产品");
    info!("   PUT    /products/:id              - 更新产品");
    info!("   DELETE /products/:id              - 删除产品");
    info!("   GET    /web/products              - 产品管理页面");
    info!("   GET    /health                    - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("无法监听关闭信号: {}", e);
    }
}
