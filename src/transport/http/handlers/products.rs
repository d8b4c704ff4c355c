use crate::app::CatalogError;
use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use crate::transport::http::types::{error_response, json_400, AppState, ErrorBody};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn internal_error_message(self) -> &'static str {
        match self {
            Operation::List => "Internal error while listing products.",
            Operation::Get => "Internal error while fetching product details.",
            Operation::Create => "Internal error while creating product.",
            Operation::Update => "Internal error while updating product.",
            Operation::Delete => "Internal error while deleting product.",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Operation::Update => "Invalid data for product update.",
            _ => "Invalid data for product creation.",
        }
    }

    fn duplicate_message(self, field: &str) -> String {
        match (self, field) {
            (Operation::Update, "sku") => "SKU already belongs to another product.".to_string(),
            (_, "sku") => "SKU already registered.".to_string(),
            (_, other) => format!("Value for '{}' is already in use.", other),
        }
    }
}

/// Maps a catalog outcome to its HTTP status and error body.
fn failure_response(op: Operation, err: CatalogError) -> Response {
    match err {
        CatalogError::Invalid(errors) => {
            // Record-level failures (non-object body, empty update) carry no field map.
            if errors.field_errors.is_empty() && !errors.form_errors.is_empty() {
                return error_response(StatusCode::BAD_REQUEST, errors.form_errors.join(" "));
            }
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    message: op.invalid_message().to_string(),
                    errors: Some(errors.field_errors),
                }),
            )
                .into_response()
        }
        CatalogError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Product not found."),
        CatalogError::DuplicateKey { field } => {
            error_response(StatusCode::CONFLICT, op.duplicate_message(&field))
        }
        CatalogError::Unavailable(e) => {
            tracing::error!(error = ?e, operation = ?op, "catalog operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, op.internal_error_message())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products, newest first", body = [Product]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_products_handler(State(state): State<AppState>) -> Response {
    match state.catalog.list().await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => failure_response(Operation::List, e),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (UUID)")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.catalog.get(&id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => failure_response(Operation::Get, e),
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductCreateData,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product data", body = ErrorBody),
        (status = 409, description = "SKU already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Json(payload) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e),
    };
    match state.catalog.create(&payload).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => failure_response(Operation::Create, e),
    }
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (UUID)")
    ),
    request_body = ProductUpdateData,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid product data or nothing to update", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 409, description = "SKU belongs to another product", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Json(payload) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e),
    };
    match state.catalog.update(&id, &payload).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => failure_response(Operation::Update, e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (UUID)")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.catalog.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => failure_response(Operation::Delete, e),
    }
}
