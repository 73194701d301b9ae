//! 基于 SQLx 的 SQLite 产品存储

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use super::model::{Product, ProductForm};
use super::store::{ensure_finite, ProductStore, StoreError};

/// 建表语句。`AUTOINCREMENT` 保证删除后的 ID 不会被复用。
pub const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        description TEXT,
        price REAL NOT NULL
    )
"#;

/// SQLite 的 `SQLITE_FULL`，AUTOINCREMENT 用尽时返回
const SQLITE_FULL: &str = "13";

#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 创建 products 表（已存在时跳过）
    pub async fn create_table(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_PRODUCTS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, product: &Product) -> Result<i64, sqlx::Error> {
        let result = match product.id {
            Some(id) => {
                sqlx::query(
                    "INSERT INTO products (id, name, description, price) VALUES (?, ?, ?, ?)",
                )
                .bind(id)
                .bind(product.name.as_deref())
                .bind(product.description.as_deref())
                .bind(product.price)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("INSERT INTO products (name, description, price) VALUES (?, ?, ?)")
                    .bind(product.name.as_deref())
                    .bind(product.description.as_deref())
                    .bind(product.price)
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(product.id.unwrap_or_else(|| result.last_insert_rowid()))
    }

    /// AUTOINCREMENT 记录的最大已分配 ID，尚未插入过时为 `None`
    async fn last_assigned_id(&self) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT seq FROM sqlite_sequence WHERE name = 'products'")
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn create(&self, mut product: Product) -> Result<Product, StoreError> {
        ensure_finite(product.price)?;

        match product.id {
            Some(id) => {
                if self.get_by_id(id).await?.is_some() {
                    return Err(StoreError::DuplicateId(id));
                }
            }
            None => {
                if self.last_assigned_id().await? == Some(i64::MAX) {
                    return Err(StoreError::IdExhausted);
                }
            }
        }

        let id = self.insert(&product).await.map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::DuplicateId(product.id.unwrap_or_default())
            }
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(SQLITE_FULL) => {
                StoreError::IdExhausted
            }
            other => StoreError::Database(other),
        })?;

        product.id = Some(id);
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn get_all(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn update(&self, id: i64, fields: ProductForm) -> Result<Product, StoreError> {
        ensure_finite(fields.price)?;

        let result =
            sqlx::query("UPDATE products SET name = ?, description = ?, price = ? WHERE id = ?")
                .bind(fields.name.as_deref())
                .bind(fields.description.as_deref())
                .bind(fields.price)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        let mut product = fields.into_product();
        product.id = Some(id);
        Ok(product)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
