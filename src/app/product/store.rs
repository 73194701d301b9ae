//! 产品存储抽象
//!
//! 存储层只负责持久化，除拒绝非有限价格外不做校验；业务校验由 [`ProductService`](super::service::ProductService) 在调用前完成。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{Product, ProductForm};

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("产品 {0} 不存在")]
    NotFound(i64),
    #[error("产品 ID {0} 已存在")]
    DuplicateId(i64),
    #[error("产品 ID 已用尽")]
    IdExhausted,
    #[error("价格 {0} 不是有限数值，无法保存")]
    NonFinitePrice(f64),
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

/// 价格必须是有限数值：SQLite 会把 NaN 存成 NULL，JSON 也无法表示无穷大
pub(crate) fn ensure_finite(price: f64) -> Result<(), StoreError> {
    if price.is_finite() {
        Ok(())
    } else {
        Err(StoreError::NonFinitePrice(price))
    }
}

/// 产品存储 trait
///
/// 所有方法只操作单条记录（`delete_all` 除外），不跨记录维护约束。
/// 除了拒绝非有限价格外不做校验。
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 保存新产品。`id` 为空时分配新的 ID，返回带 ID 的记录。
    async fn create(&self, product: Product) -> Result<Product, StoreError>;

    /// ID 不存在时返回 `Ok(None)`
    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// 按 ID 升序返回全部记录
    async fn get_all(&self) -> Result<Vec<Product>, StoreError>;

    /// 整体覆盖 `name`、`description`、`price`。ID 不存在时返回 [`StoreError::NotFound`]。
    async fn update(&self, id: i64, fields: ProductForm) -> Result<Product, StoreError>;

    /// 返回是否删除了记录，ID 不存在不算错误
    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// 返回删除的记录数
    async fn delete_all(&self) -> Result<u64, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    last_id: i64,
}

/// 内存存储
///
/// ID 单调递增，删除后不复用。
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    state: RwLock<MemoryState>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, mut product: Product) -> Result<Product, StoreError> {
        ensure_finite(product.price)?;
        let mut state = self.state.write().await;

        let id = match product.id {
            Some(id) if state.products.contains_key(&id) => {
                return Err(StoreError::DuplicateId(id));
            }
            Some(id) => {
                state.last_id = state.last_id.max(id);
                id
            }
            None => {
                state.last_id = state
                    .last_id
                    .checked_add(1)
                    .ok_or(StoreError::IdExhausted)?;
                state.last_id
            }
        };

        product.id = Some(id);
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn update(&self, id: i64, fields: ProductForm) -> Result<Product, StoreError> {
        ensure_finite(fields.price)?;
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        product.overwrite(fields);
        Ok(product.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let removed = state.products.len() as u64;
        state.products.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().await.products.len() as u64)
    }
}
