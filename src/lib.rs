//! # 产品目录服务
//!
//! 一个最小的产品目录 CRUD 服务，提供：
//! - JSON REST 接口 (`/products`)
//! - 服务端渲染的管理页面 (`/web/products`)
//! - 所有入口共用的一套产品校验规则
//! - SQLite（SQLx）或内存两种存储实现

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::product::model::{Product, ProductForm};
pub use app::{build_app, create_routes, open_store, AppState};
