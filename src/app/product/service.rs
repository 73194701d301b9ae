//! 产品业务服务

use std::sync::Arc;

use tracing::info;
use validator::ValidationErrors;

use super::model::{Product, ProductForm};
use super::store::{ProductStore, StoreError};
use super::validation::{describe, sanitize, RuleSet};

/// 服务层错误
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("校验失败: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("产品 {0} 不存在")]
    NotFound(i64),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ProductError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ProductError::NotFound(id),
            other => ProductError::Store(other),
        }
    }
}

impl ProductError {
    /// 面向用户的错误信息；校验失败时只给出规则信息，不带字段前缀
    pub fn user_message(&self) -> String {
        match self {
            ProductError::Validation(errors) => describe(errors)
                .into_iter()
                .map(|(_, message)| message)
                .collect::<Vec<_>>()
                .join(", "),
            ProductError::NotFound(_) => "Product not found".to_string(),
            ProductError::Store(err) => format!("Database error occurred: {}", err),
        }
    }
}

/// 产品服务
///
/// 持有注入的存储句柄，是唯一执行校验的地方。REST 与表单页面都经由这里访问存储。
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    rules: RuleSet,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            rules: RuleSet::Strict,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub async fn list(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.store.get_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, ProductError> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn create(&self, form: ProductForm) -> Result<Product, ProductError> {
        let form = self.prepare(form)?;
        let product = self.store.create(form.into_product()).await?;

        info!(
            "Created product: {:?} ({})",
            product.name,
            product.id.unwrap_or_default()
        );
        Ok(product)
    }

    pub async fn update(&self, id: i64, form: ProductForm) -> Result<Product, ProductError> {
        let form = self.prepare(form)?;
        let product = self.store.update(id, form).await?;

        info!("Updated product: {:?} ({})", product.name, id);
        Ok(product)
    }

    /// 返回是否确实删除了记录
    pub async fn delete(&self, id: i64) -> Result<bool, ProductError> {
        let removed = self.store.delete_by_id(id).await?;
        if removed {
            info!("Deleted product: {}", id);
        }
        Ok(removed)
    }

    pub async fn delete_all(&self) -> Result<u64, ProductError> {
        let removed = self.store.delete_all().await?;
        info!("Deleted {} products", removed);
        Ok(removed)
    }

    pub async fn count(&self) -> Result<u64, ProductError> {
        Ok(self.store.count().await?)
    }

    fn prepare(&self, mut form: ProductForm) -> Result<ProductForm, ProductError> {
        self.rules.validate(&form)?;
        form.description = form.description.map(|text| sanitize(Some(text.as_str())));
        Ok(form)
    }
}
