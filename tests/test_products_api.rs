//! End-to-end API test: the real router served on an ephemeral port over the in-memory
//! gateway, driven with `reqwest` and `ProductClient`.

use product_catalog::client::{CatalogView, ProductForm};
use product_catalog::{transport, CatalogService, ClientError, InMemoryProductStore, Product, ProductClient};
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn spawn_server() -> Result<TestServer, Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryProductStore::new());
    let app_state = transport::http::AppState {
        catalog: Arc::new(CatalogService::new(store)),
    };
    let router = transport::http::create_router(app_state);

    // Bind to an ephemeral port to avoid conflicts between tests.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        handle,
    })
}

fn collar() -> JsonValue {
    json!({
        "name": "Collar",
        "description": "Leather dog collar, medium",
        "price": 19.90,
        "sku": "COL-001",
        "stock": 10
    })
}

#[tokio::test]
async fn test_create_then_get_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/products", server.base_url))
        .json(&collar())
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Product = resp.json().await?;
    assert_eq!(created.name, "Collar");
    assert_eq!(created.sku, "COL-001");
    assert_eq!(created.stock, 10);
    assert_eq!(created.image_url, None);
    assert_eq!(created.created_at, created.updated_at);

    let resp = client
        .get(format!("{}/api/products/{}", server.base_url, created.id))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Product = resp.json().await?;
    assert_eq!(fetched, created);

    // Wire shape uses camelCase keys.
    let raw: JsonValue = client
        .get(format!("{}/api/products/{}", server.base_url, created.id))
        .send()
        .await?
        .json()
        .await?;
    for key in ["id", "name", "description", "price", "sku", "stock", "imageUrl", "createdAt", "updatedAt"] {
        assert!(raw.get(key).is_some(), "missing key {}", key);
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_create_returns_field_errors() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/products", server.base_url))
        .json(&json!({ "name": "Co", "price": 0, "sku": "C1", "stock": 1 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["message"], "Invalid data for product creation.");
    assert_eq!(body["errors"]["name"][0], "Name must be at least 3 characters.");
    assert_eq!(body["errors"]["description"][0], "Required");
    assert_eq!(body["errors"]["price"][0], "Price must be a positive number.");
    assert_eq!(body["errors"]["sku"][0], "SKU must be at least 3 characters.");
    assert!(body["errors"].get("stock").is_none());

    let list: Vec<Product> = client
        .get(format!("{}/api/products", server.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert!(list.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/products", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = resp.json().await?;
    assert!(body["message"].as_str().unwrap_or("").starts_with("Malformed JSON body"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_sku_is_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/products", server.base_url);

    let first = client.post(&url).json(&collar()).send().await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(&url).json(&collar()).send().await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: JsonValue = second.json().await?;
    assert_eq!(body["message"], "SKU already registered.");

    // Moving another item onto the taken sku is also a conflict.
    let mut leash = collar();
    leash["name"] = json!("Leash");
    leash["sku"] = json!("LEA-001");
    let leash: Product = client.post(&url).json(&leash).send().await?.json().await?;
    let resp = client
        .put(format!("{}/{}", url, leash.id))
        .json(&json!({ "sku": "COL-001" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["message"], "SKU already belongs to another product.");
    Ok(())
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/products", server.base_url);

    let created: Product = client.post(&url).json(&collar()).send().await?.json().await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let resp = client
        .put(format!("{}/{}", url, created.id))
        .json(&json!({ "stock": 5 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Product = resp.json().await?;
    assert_eq!(updated.stock, 5);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.price, created.price);
    assert_eq!(updated.sku, created.sku);
    assert_eq!(updated.image_url, created.image_url);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_update_rejections() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/products", server.base_url);
    let created: Product = client.post(&url).json(&collar()).send().await?.json().await?;

    let resp = client
        .put(format!("{}/{}", url, created.id))
        .json(&json!({ "color": "brown" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["message"], "No data provided for update.");
    assert!(body.get("errors").is_none());

    let resp = client
        .put(format!("{}/{}", url, created.id))
        .json(&json!({ "price": -1 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["message"], "Invalid data for product update.");
    assert_eq!(body["errors"]["price"][0], "Price must be a positive number.");

    let resp = client
        .put(format!("{}/{}", url, uuid::Uuid::new_v4()))
        .json(&json!({ "stock": 1 }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_twice_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/products", server.base_url);
    let created: Product = client.post(&url).json(&collar()).send().await?.json().await?;
    let item_url = format!("{}/{}", url, created.id);

    let first = client.delete(&item_url).send().await?;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert!(first.bytes().await?.is_empty());

    let second = client.delete(&item_url).send().await?;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    let body: JsonValue = second.json().await?;
    assert_eq!(body["message"], "Product not found.");

    assert_eq!(client.get(&item_url).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        client.put(&item_url).json(&json!({ "stock": 1 })).send().await?.status(),
        StatusCode::NOT_FOUND
    );
    Ok(())
}

#[tokio::test]
async fn test_malformed_id_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let resp = reqwest::Client::new()
        .get(format!("{}/api/products/not-a-uuid", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_list_is_newest_first() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = ProductClient::new(format!("{}/api", server.base_url))?;

    let form_a = ProductForm {
        name: "Collar".to_string(),
        description: "Leather dog collar, medium".to_string(),
        price: "19.90".to_string(),
        sku: "COL-001".to_string(),
        stock: "10".to_string(),
        image_url: String::new(),
    };
    let form_b = ProductForm {
        name: "Leash".to_string(),
        sku: "LEA-001".to_string(),
        ..form_a.clone()
    };
    let a = client.add_product(&form_a.to_create_data()?).await?;
    let b = client.add_product(&form_b.to_create_data()?).await?;

    let listed = client.list_products().await?;
    let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
    Ok(())
}

#[tokio::test]
async fn test_client_normalizes_api_errors() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = ProductClient::new(format!("{}/api", server.base_url))?;

    let missing = client.get_product(&uuid::Uuid::new_v4().to_string()).await;
    match missing {
        Err(ClientError::Api { status, message, .. }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Product not found.");
        }
        other => panic!("expected Api error, got {:?}", other),
    }

    let bad = client
        .update_product(&uuid::Uuid::new_v4().to_string(), &Default::default())
        .await;
    match bad {
        Err(ClientError::Api { status, message, .. }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "No data provided for update.");
        }
        other => panic!("expected Api error, got {:?}", other),
    }

    // A route the API does not serve has no JSON body; the status line is used instead.
    let stray = ProductClient::new(format!("{}/nowhere", server.base_url))?;
    match stray.list_products().await {
        Err(ClientError::Api { status, message, .. }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "API error: Not Found (Status: 404)");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_view_reconciles_with_server() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = ProductClient::new(format!("{}/api", server.base_url))?;
    let mut view = CatalogView::new();

    view.refresh(&client).await;
    assert!(view.products.is_empty());
    assert!(view.load_error.is_none());

    let form = ProductForm {
        name: "Collar".to_string(),
        description: "Leather dog collar, medium".to_string(),
        price: "19.90".to_string(),
        sku: "COL-001".to_string(),
        stock: "10".to_string(),
        image_url: String::new(),
    };
    let created = view.submit_create(&client, &form).await?;
    assert_eq!(view.products.len(), 1);

    // Server-side rejection surfaces as the submit error and leaves the list alone.
    let err = view.submit_create(&client, &form).await.unwrap_err();
    assert_eq!(err, "SKU already registered.");
    assert_eq!(view.submit_error.as_deref(), Some("SKU already registered."));
    assert_eq!(view.products.len(), 1);

    let mut edit = view.begin_edit(created.id).expect("item is listed");
    edit.stock = "3".to_string();
    let updated = view.submit_update(&client, created.id, &edit).await?;
    assert_eq!(updated.stock, 3);
    assert_eq!(view.products[0].stock, 3);
    assert!(view.submit_error.is_none());

    view.remove(&client, created.id).await?;
    assert!(view.products.is_empty());

    view.refresh(&client).await;
    assert!(view.products.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let resp = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_nul_in_text_is_rejected_before_storage() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server().await?;
    let client = reqwest::Client::new();
    let mut payload = collar();
    payload["name"] = json!("ab\u{0}c");

    let resp = client
        .post(format!("{}/api/products", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: JsonValue = resp.json().await?;
    assert_eq!(body["errors"]["name"][0], "Text cannot contain NUL characters.");

    let list: Vec<Product> = client
        .get(format!("{}/api/products", server.base_url))
        .send()
        .await?
        .json()
        .await?;
    assert!(list.is_empty());
    Ok(())
}
