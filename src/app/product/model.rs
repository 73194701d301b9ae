//! 产品数据模型

use serde::{Deserialize, Serialize};

/// 产品实体
///
/// `id` 在首次持久化之前为空，由存储层分配，之后保持不变。
/// 存储层不校验 `name` 和 `price`，因此这两个字段可以保存“无效”值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: Some(description.into()),
            price,
        }
    }

    /// 用表单字段整体覆盖当前记录（不做字段合并）
    pub fn overwrite(&mut self, fields: ProductForm) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
    }
}

/// 创建 / 更新产品时提交的字段
///
/// 未提交的字段按缺省值处理，不会从已有记录中合并。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
}

impl ProductForm {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            price,
        }
    }

    pub fn into_product(self) -> Product {
        Product {
            id: None,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}
