//! 产品校验规则
//!
//! 所有入口（REST 与表单页面）共用这里的规则，不在处理器中重复实现。
//! 规则分两档：
//! - [`RuleSet::Strict`]：名称非空、不超过 100 个字符、只含字母数字空格 `-` `_`，价格在 (0, 999999.99] 内
//! - [`RuleSet::Relaxed`]：只要求名称非空且价格大于 0
//!
//! 宽松档不是严格档的子集替代，调用方需要显式选择档位。

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::model::{Product, ProductForm};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_PRICE: f64 = 999_999.99;

/// `sanitize` 删除的字面量（区分大小写，单次替换）
const DENYLIST: [&str; 3] = ["<script>", "</script>", "javascript:"];

/// 单条校验失败：字段 + 可读信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub code: &'static str,
    pub message: &'static str,
}

impl ValidationFailure {
    const fn new(field: &'static str, code: &'static str, message: &'static str) -> Self {
        Self {
            field,
            code,
            message,
        }
    }

    pub fn into_errors(self) -> ValidationErrors {
        let mut error = ValidationError::new(self.code);
        error.message = Some(Cow::Borrowed(self.message));

        let mut errors = ValidationErrors::new();
        errors.add(self.field, error);
        errors
    }
}

const NAME_EMPTY: ValidationFailure =
    ValidationFailure::new("name", "required", "Product name cannot be empty");
const NAME_TOO_LONG: ValidationFailure = ValidationFailure::new(
    "name",
    "length",
    "Product name cannot exceed 100 characters",
);
const NAME_CHARSET: ValidationFailure = ValidationFailure::new(
    "name",
    "charset",
    "Product name may only contain letters, digits, spaces, '-' and '_'",
);
const PRICE_NOT_POSITIVE: ValidationFailure = ValidationFailure::new(
    "price",
    "range",
    "Product price must be greater than 0",
);
const PRICE_TOO_HIGH: ValidationFailure =
    ValidationFailure::new("price", "range", "Product price cannot exceed 999999.99");

fn is_blank(name: Option<&str>) -> bool {
    name.map_or(true, |n| n.trim().is_empty())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_'
}

fn is_positive(price: f64) -> bool {
    price > 0.0
}

/// 严格的名称校验
pub fn is_valid_name(name: Option<&str>) -> bool {
    match name {
        None => false,
        Some(name) => {
            !name.trim().is_empty()
                && name.chars().count() <= MAX_NAME_LENGTH
                && name.chars().all(is_name_char)
        }
    }
}

/// 严格的价格校验：`0 < price <= 999999.99`
pub fn is_valid_price(price: f64) -> bool {
    price > 0.0 && price <= MAX_PRICE
}

/// 宽松校验：名称非空且价格大于 0。
///
/// 不检查长度、字符集和价格上限，不能当作 `is_valid_name && is_valid_price` 使用。
pub fn validate_product(product: &Product) -> bool {
    !is_blank(product.name.as_deref()) && is_positive(product.price)
}

/// 删除 `<script>`、`</script>`、`javascript:` 字面量后去掉首尾空白。
///
/// 只是字面量过滤，不处理大小写变体和嵌套写法，不能当作 HTML 转义使用。
pub fn sanitize(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(text) => DENYLIST
            .iter()
            .fold(text.to_string(), |acc, token| acc.replace(token, ""))
            .trim()
            .to_string(),
    }
}

/// 按严格规则检查，返回第一条失败的规则
pub fn check_product(name: Option<&str>, price: f64) -> Result<(), ValidationFailure> {
    if is_blank(name) {
        return Err(NAME_EMPTY);
    }
    if !is_positive(price) {
        return Err(PRICE_NOT_POSITIVE);
    }
    let name = name.unwrap_or_default();
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NAME_TOO_LONG);
    }
    if price > MAX_PRICE {
        return Err(PRICE_TOO_HIGH);
    }
    if !name.chars().all(is_name_char) {
        return Err(NAME_CHARSET);
    }
    Ok(())
}

fn check_relaxed(name: Option<&str>, price: f64) -> Result<(), ValidationFailure> {
    if is_blank(name) {
        return Err(NAME_EMPTY);
    }
    if !is_positive(price) {
        return Err(PRICE_NOT_POSITIVE);
    }
    Ok(())
}

/// 校验档位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    #[default]
    Strict,
    Relaxed,
}

impl RuleSet {
    pub fn check(self, name: Option<&str>, price: f64) -> Result<(), ValidationFailure> {
        match self {
            RuleSet::Strict => check_product(name, price),
            RuleSet::Relaxed => check_relaxed(name, price),
        }
    }

    pub fn accepts(self, product: &Product) -> bool {
        self.check(product.name.as_deref(), product.price).is_ok()
    }

    pub fn validate(self, form: &ProductForm) -> Result<(), ValidationErrors> {
        self.check(form.name.as_deref(), form.price)
            .map_err(ValidationFailure::into_errors)
    }
}

impl Validate for ProductForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        RuleSet::Strict.validate(self)
    }
}

/// 把 `ValidationErrors` 展平为 (字段, 信息) 列表，按字段名排序
pub fn describe(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut described: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("invalid {}", field));
                (field.to_string(), message)
            })
        })
        .collect();
    described.sort();
    described
}
