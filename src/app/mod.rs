//! 应用层：路由装配与共享状态

pub mod product;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::{DatabaseConfig, HttpConfig, MEMORY_DATABASE_URL};
use crate::core::middleware::request_logging_middleware;
use crate::infrastructure::database::DatabaseManager;
use product::{
    handler,
    service::ProductService,
    sqlite::SqliteProductStore,
    store::{MemoryProductStore, ProductStore, StoreError},
    web,
};

/// 处理器共享状态，存储句柄经由服务层显式注入
#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

impl AppState {
    pub fn new(product_service: ProductService) -> Self {
        Self { product_service }
    }
}

/// 根据配置打开产品存储
///
/// `database.url = "memory"` 时使用内存存储，否则连接 SQLite 并建表。
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn ProductStore>, StoreError> {
    if config.url == MEMORY_DATABASE_URL {
        info!("Using in-memory product store");
        return Ok(Arc::new(MemoryProductStore::new()));
    }

    let manager = DatabaseManager::new(config).await?;
    let store = SqliteProductStore::new(manager.get_pool().clone());
    store.create_table().await?;
    Ok(Arc::new(store))
}

/// 所有路由（不含中间件层）
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handler::health_check))
        .route(
            "/products",
            get(handler::list_products).post(handler::create_product),
        )
        .route(
            "/products/:id",
            get(handler::get_product)
                .put(handler::update_product)
                .delete(handler::delete_product),
        )
        .route(web::LIST_PATH, get(web::list_page).post(web::create))
        .route("/web/products/edit/:id", get(web::edit_page))
        .route("/web/products/update/:id", post(web::update))
        .route("/web/products/delete/:id", get(web::delete))
}

/// 完整应用：路由 + 日志、追踪、超时、CORS 中间件
pub fn build_app(state: AppState, http: &HttpConfig) -> Router {
    create_routes()
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_seconds)))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
