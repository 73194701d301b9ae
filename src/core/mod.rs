//! 核心层：错误映射与中间件

pub mod error;
pub mod middleware;
