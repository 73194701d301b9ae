//! 产品模块：模型、校验、存储、服务与处理器

pub mod handler;
pub mod model;
pub mod service;
pub mod sqlite;
pub mod store;
pub mod validation;
pub mod web;
