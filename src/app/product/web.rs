//! 产品管理页面（服务端渲染 HTML）
//!
//! 失败时不返回 HTTP 错误码，而是重定向回列表页并通过查询参数带上提示信息。

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use super::model::{Product, ProductForm};
use super::service::ProductError;
use crate::app::AppState;
use crate::core::error::CoreError;

pub const LIST_PATH: &str = "/web/products";

const PRICE_NOT_A_NUMBER: &str = "Product price must be a number";
const INVALID_ID: &str = "Invalid product id";

/// 列表页上的一次性提示
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// 表单原始输入，价格保持字符串以便给出可读的错误
#[derive(Debug, Default, Deserialize)]
pub struct ProductFormInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl ProductFormInput {
    /// 空价格按 0 处理，交给校验规则报告；无法解析的价格以及 `inf`、`NaN` 直接报错
    pub fn parse(self) -> Result<ProductForm, &'static str> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => 0.0,
            Some(raw) => raw.parse::<f64>().map_err(|_| PRICE_NOT_A_NUMBER)?,
        };
        if !price.is_finite() {
            return Err(PRICE_NOT_A_NUMBER);
        }

        Ok(ProductForm {
            name: self.name,
            description: self.description,
            price,
        })
    }
}

fn redirect_success(message: &str) -> Redirect {
    Redirect::to(&format!(
        "{}?success={}",
        LIST_PATH,
        urlencoding::encode(message)
    ))
}

fn redirect_error(message: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", LIST_PATH, urlencoding::encode(message)))
}

/// 路径中的 ID 无法解析时回到列表页
fn parse_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, Redirect> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!("Rejected product id: {}", rejection.body_text());
        redirect_error(INVALID_ID)
    })
}

fn redirect_failure(err: ProductError) -> Redirect {
    if let ProductError::Store(ref store_err) = err {
        warn!("Product store failure: {}", store_err);
    }
    redirect_error(&err.user_message())
}

/// 产品列表页 + 新建表单
pub async fn list_page(
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>, CoreError> {
    let products = state.product_service.list().await?;
    Ok(Html(render_list(&products, &flash)))
}

/// 表单新建
pub async fn create(State(state): State<AppState>, Form(input): Form<ProductFormInput>) -> Redirect {
    let form = match input.parse() {
        Ok(form) => form,
        Err(message) => return redirect_error(message),
    };

    match state.product_service.create(form).await {
        Ok(_) => redirect_success("Product created successfully!"),
        Err(err) => redirect_failure(err),
    }
}

/// 编辑页
pub async fn edit_page(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match parse_id(path) {
        Ok(id) => id,
        Err(redirect) => return redirect.into_response(),
    };

    match state.product_service.get(id).await {
        Ok(Some(product)) => Html(render_edit(id, &product)).into_response(),
        Ok(None) => redirect_failure(ProductError::NotFound(id)).into_response(),
        Err(err) => redirect_failure(err).into_response(),
    }
}

/// 表单更新
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Form(input): Form<ProductFormInput>,
) -> Redirect {
    let id = match parse_id(path) {
        Ok(id) => id,
        Err(redirect) => return redirect,
    };
    let form = match input.parse() {
        Ok(form) => form,
        Err(message) => return redirect_error(message),
    };

    match state.product_service.update(id, form).await {
        Ok(_) => redirect_success("Product updated successfully!"),
        Err(err) => redirect_failure(err),
    }
}

/// 删除；记录不存在时同样视为成功
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Redirect {
    let id = match parse_id(path) {
        Ok(id) => id,
        Err(redirect) => return redirect,
    };

    match state.product_service.delete(id).await {
        Ok(_) => redirect_success("Product deleted successfully!"),
        Err(err) => redirect_failure(err),
    }
}

fn text(value: Option<&str>) -> String {
    ammonia::clean_text(value.unwrap_or_default())
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; }}
        .success {{ background: #e6f4ea; padding: 10px; border-left: 4px solid #28a745; }}
        .error {{ background: #fdecea; padding: 10px; border-left: 4px solid #dc3545; }}
        table {{ width: 100%; border-collapse: collapse; }}
        td, th {{ padding: 8px; border-bottom: 1px solid #ddd; text-align: left; }}
    </style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>
"#,
        title = title,
        body = body
    )
}

pub fn render_list(products: &[Product], flash: &FlashQuery) -> String {
    let mut body = String::from("        <h1>Products</h1>\n");

    if let Some(message) = &flash.success {
        body.push_str(&format!(
            "        <p class=\"success\">{}</p>\n",
            text(Some(message.as_str()))
        ));
    }
    if let Some(message) = &flash.error {
        body.push_str(&format!(
            "        <p class=\"error\">{}</p>\n",
            text(Some(message.as_str()))
        ));
    }

    if products.is_empty() {
        body.push_str("        <p>No products yet.</p>\n");
    } else {
        body.push_str(
            "        <table>\n            <tr><th>ID</th><th>Name</th><th>Description</th><th>Price</th><th></th></tr>\n",
        );
        for product in products {
            let id = product.id.unwrap_or_default();
            body.push_str(&format!(
                "            <tr><td>{id}</td><td>{name}</td><td>{description}</td><td>{price:.2}</td>\
                 <td><a href=\"{base}/edit/{id}\">Edit</a> <a href=\"{base}/delete/{id}\">Delete</a></td></tr>\n",
                id = id,
                name = text(product.name.as_deref()),
                description = text(product.description.as_deref()),
                price = product.price,
                base = LIST_PATH,
            ));
        }
        body.push_str("        </table>\n");
    }

    body.push_str(&format!(
        r#"        <h2>Add product</h2>
        <form method="post" action="{base}">
            <p><label>Name <input type="text" name="name"></label></p>
            <p><label>Description <input type="text" name="description"></label></p>
            <p><label>Price <input type="text" name="price"></label></p>
            <p><button type="submit">Create</button></p>
        </form>
"#,
        base = LIST_PATH
    ));

    page("Products", &body)
}

pub fn render_edit(id: i64, product: &Product) -> String {
    let body = format!(
        r#"        <h1>Edit product {id}</h1>
        <form method="post" action="{base}/update/{id}">
            <p><label>Name <input type="text" name="name" value="{name}"></label></p>
            <p><label>Description <input type="text" name="description" value="{description}"></label></p>
            <p><label>Price <input type="text" name="price" value="{price}"></label></p>
            <p><button type="submit">Update</button> <a href="{base}">Cancel</a></p>
        </form>
"#,
        id = id,
        base = LIST_PATH,
        name = text(product.name.as_deref()),
        description = text(product.description.as_deref()),
        price = product.price,
    );

    page("Edit product", &body)
}
