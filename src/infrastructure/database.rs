//! 数据库基础设施

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Error,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub struct DatabaseManager {
    pool: SqlitePool,
}

/// `sqlite::memory:` 一类的地址：每个连接各有一份数据库
pub fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, Error> {
        info!("Connecting to database: {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool_options = if is_in_memory(&config.url) {
            // 内存库只能用单个常驻连接，否则连接回收后数据丢失
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:catalog?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://catalog.db"));
    }
}
