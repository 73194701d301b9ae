use axum::http::StatusCode;
use axum_test::TestServer;
use catalog::app::product::service::ProductService;
use catalog::app::product::validation::RuleSet;
use catalog::config::{DatabaseConfig, HttpConfig};
use catalog::core::error::ErrorResponse;
use catalog::{build_app, open_store, AppState, Product};
use serde_json::json;

async fn create_test_app() -> TestServer {
    create_test_app_with_rules(RuleSet::Strict).await
}

async fn create_test_app_with_rules(rules: RuleSet) -> TestServer {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let store = open_store(&config).await.unwrap();
    let state = AppState::new(ProductService::new(store).with_rules(rules));

    TestServer::new(build_app(state, &HttpConfig::default())).unwrap()
}

async fn create_test_product(server: &TestServer, name: &str, description: &str, price: f64) -> Product {
    let response = server
        .post("/products")
        .json(&json!({ "name": name, "description": description, "price": price }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Product>()
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// REST
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_all_products_empty_list() {
    let server = create_test_app().await;

    let response = server.get("/products").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Product>>(), vec![]);
}

#[tokio::test]
async fn test_create_assigns_first_id() {
    let server = create_test_app().await;

    let created = create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;
    assert_eq!(created.id, Some(1));

    let response = server.get("/products").await;
    let products: Vec<Product> = response.json();
    assert_eq!(
        products,
        vec![Product {
            id: Some(1),
            ..Product::new("Laptop", "High-performance laptop", 1299.99)
        }]
    );
}

#[tokio::test]
async fn test_get_all_products_with_products() {
    let server = create_test_app().await;
    create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;
    create_test_product(&server, "Mouse", "Wireless mouse", 29.99).await;

    let body: serde_json::Value = server.get("/products").await.json();
    assert_eq!(body[0]["name"], "Laptop");
    assert_eq!(body[0]["price"], 1299.99);
    assert_eq!(body[1]["name"], "Mouse");
    assert_eq!(body[1]["price"], 29.99);
}

#[tokio::test]
async fn test_get_product_by_id() {
    let server = create_test_app().await;
    let product = create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;

    let response = server
        .get(&format!("/products/{}", product.id.unwrap()))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], product.id.unwrap());
    assert_eq!(body["name"], "Laptop");
    assert_eq!(body["description"], "High-performance laptop");
    assert_eq!(body["price"], 1299.99);
}

#[tokio::test]
async fn test_get_missing_product_is_not_found() {
    let server = create_test_app().await;

    let response = server.get("/products/999").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: ErrorResponse = response.json();
    assert_eq!(body.code, 404);
    assert_eq!(body.error, "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let server = create_test_app().await;

    server
        .get("/products/invalid-id")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put("/products/invalid-id")
        .json(&json!({ "name": "Updated Name", "description": "", "price": 100.0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .delete("/products/invalid-id")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_invalid_name() {
    let server = create_test_app().await;

    let response = server
        .post("/products")
        .json(&json!({ "name": "Test Product!", "description": "", "price": 10.0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "VALIDATION_FAILED");
    assert_eq!(body.field.as_deref(), Some("name"));

    let products: Vec<Product> = server.get("/products").await.json();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_create_rejects_out_of_range_price() {
    let server = create_test_app().await;

    for price in [0.0, -1.0, 1_000_000.0] {
        let response = server
            .post("/products")
            .json(&json!({ "name": "Mouse", "price": price }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: ErrorResponse = response.json();
        assert_eq!(body.field.as_deref(), Some("price"));
    }
}

#[tokio::test]
async fn test_create_with_invalid_json() {
    let server = create_test_app().await;

    server
        .post("/products")
        .text("{ invalid json }")
        .content_type("application/json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_sanitizes_description() {
    let server = create_test_app().await;

    let product = create_test_product(&server, "Widget", " <script>alert(1)</script> ", 5.0).await;
    assert_eq!(product.description.as_deref(), Some("alert(1)"));
}

#[tokio::test]
async fn test_update_existing_product() {
    let server = create_test_app().await;
    let existing = create_test_product(&server, "Old Name", "Old Description", 50.0).await;
    let id = existing.id.unwrap();

    let response = server
        .put(&format!("/products/{}", id))
        .json(&json!({ "name": "Updated Name", "description": "Updated Description", "price": 100.0 }))
        .await;
    response.assert_status_ok();

    let updated: Product = response.json();
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.name.as_deref(), Some("Updated Name"));
    assert_eq!(updated.description.as_deref(), Some("Updated Description"));
    assert_eq!(updated.price, 100.0);

    let fetched: Product = server.get(&format!("/products/{}", id)).await.json();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let server = create_test_app().await;
    create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;
    let before: Vec<Product> = server.get("/products").await.json();

    server
        .put("/products/999")
        .json(&json!({ "name": "Updated Name", "description": "", "price": 100.0 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let after: Vec<Product> = server.get("/products").await.json();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_update_with_invalid_json() {
    let server = create_test_app().await;
    let existing = create_test_product(&server, "Test Product", "Test Description", 50.0).await;

    server
        .put(&format!("/products/{}", existing.id.unwrap()))
        .text("{ invalid json }")
        .content_type("application/json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_product() {
    let server = create_test_app().await;
    let product = create_test_product(&server, "To Delete", "Will be deleted", 50.0).await;
    let path = format!("/products/{}", product.id.unwrap());

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_product_is_noop() {
    let server = create_test_app().await;

    server
        .delete("/products/999")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_health_check_and_request_id() {
    let server = create_test_app().await;
    create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(!response.header("x-request-id").is_empty());

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["product_count"], 1);
}

// ---------------------------------------------------------------------------
// 表单页面
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_web_list_products() {
    let server = create_test_app().await;

    let response = server.get("/web/products").await;
    response.assert_status_ok();
    assert!(response.text().contains("No products yet."));

    create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;
    let html = server.get("/web/products").await.text();
    assert!(html.contains("1299.99"));
    assert!(html.contains("/web/products/edit/1"));
}

#[tokio::test]
async fn test_web_create_product() {
    let server = create_test_app().await;

    let response = server
        .post("/web/products")
        .form(&[("name", "Mouse"), ("description", "Wireless mouse"), ("price", "29.99")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/web/products?success=Product%20created%20successfully%21"
    );

    let products: Vec<Product> = server.get("/products").await.json();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, 29.99);
}

#[tokio::test]
async fn test_web_create_reports_validation_error() {
    let server = create_test_app().await;

    let response = server
        .post("/web/products")
        .form(&[("name", ""), ("description", ""), ("price", "10")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/web/products?error=Product%20name%20cannot%20be%20empty"
    );

    let response = server
        .post("/web/products")
        .form(&[("name", "Mouse"), ("description", ""), ("price", "cheap")])
        .await;
    assert_eq!(
        location(&response),
        "/web/products?error=Product%20price%20must%20be%20a%20number"
    );

    let products: Vec<Product> = server.get("/products").await.json();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_web_relaxed_rules_reject_non_finite_price() {
    let server = create_test_app_with_rules(RuleSet::Relaxed).await;

    for price in ["inf", "infinity", "NaN"] {
        let response = server
            .post("/web/products")
            .form(&[("name", "Mouse"), ("description", ""), ("price", price)])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/web/products?error=Product%20price%20must%20be%20a%20number"
        );
    }

    server
        .post("/web/products")
        .form(&[("name", "Mouse!"), ("description", ""), ("price", "29.99")])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let body = server.get("/products").await.text();
    let products: Vec<Product> = serde_json::from_str(&body).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, 29.99);
}

#[tokio::test]
async fn test_web_invalid_id_redirects_with_error() {
    let server = create_test_app().await;
    let expected = "/web/products?error=Invalid%20product%20id";

    let response = server.get("/web/products/edit/abc").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), expected);

    let response = server
        .post("/web/products/update/abc")
        .form(&[("name", "Mouse"), ("description", ""), ("price", "10")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), expected);

    let response = server.get("/web/products/delete/abc").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), expected);
}

#[tokio::test]
async fn test_web_flash_message_is_rendered() {
    let server = create_test_app().await;

    let html = server
        .get("/web/products?error=Product%20name%20cannot%20be%20empty")
        .await
        .text();
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("Product"));
}

#[tokio::test]
async fn test_web_edit_page() {
    let server = create_test_app().await;
    create_test_product(&server, "Laptop", "High-performance laptop", 1299.99).await;

    let response = server.get("/web/products/edit/1").await;
    response.assert_status_ok();
    assert!(response.text().contains("action=\"/web/products/update/1\""));

    let response = server.get("/web/products/edit/999").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/web/products?error=Product%20not%20found"
    );
}

#[tokio::test]
async fn test_web_update_product() {
    let server = create_test_app().await;
    create_test_product(&server, "Old Name", "Old Description", 50.0).await;

    let response = server
        .post("/web/products/update/1")
        .form(&[("name", "New Name"), ("description", "New"), ("price", "75.5")])
        .await;
    assert_eq!(
        location(&response),
        "/web/products?success=Product%20updated%20successfully%21"
    );

    let product: Product = server.get("/products/1").await.json();
    assert_eq!(product.name.as_deref(), Some("New Name"));
    assert_eq!(product.price, 75.5);

    let response = server
        .post("/web/products/update/999")
        .form(&[("name", "New Name"), ("description", "New"), ("price", "75.5")])
        .await;
    assert_eq!(
        location(&response),
        "/web/products?error=Product%20not%20found"
    );
}

#[tokio::test]
async fn test_web_delete_product() {
    let server = create_test_app().await;
    create_test_product(&server, "To Delete", "Will be deleted", 50.0).await;

    let response = server.get("/web/products/delete/1").await;
    assert_eq!(
        location(&response),
        "/web/products?success=Product%20deleted%20successfully%21"
    );
    server
        .get("/products/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // 不存在的记录同样视为删除成功
    let response = server.get("/web/products/delete/999").await;
    assert_eq!(
        location(&response),
        "/web/products?success=Product%20deleted%20successfully%21"
    );
}
