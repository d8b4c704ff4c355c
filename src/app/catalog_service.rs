//! The catalog service.
//!
//! Sits between the transport layer and the persistence gateway:
//! 1.  Validates untrusted payloads (`validate_create` / `validate_update`).
//! 2.  Resolves path ids; a malformed id matches no product.
//! 3.  Translates gateway outcomes into [`CatalogError`] variants.

use crate::app::error::CatalogError;
use crate::domain::product::{validate_create, validate_update};
use crate::domain::Product;
use crate::storage::ProductStore;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self
            .store
            .list()
            .await
            .map_err(|e| CatalogError::from_store(e, ""))?;
        info!(count = products.len(), "fetched products");
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Product, CatalogError> {
        let uuid = parse_id(id)?;
        match self.store.get(uuid).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => {
                warn!("product not found");
                Err(CatalogError::NotFound(id.to_string()))
            }
            Err(e) => Err(CatalogError::from_store(e, id)),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &JsonValue) -> Result<Product, CatalogError> {
        let data = validate_create(input)?;
        let product = self
            .store
            .create(data)
            .await
            .map_err(|e| CatalogError::from_store(e, ""))?;
        info!(id = %product.id, sku = %product.sku, "created product");
        Ok(product)
    }

    /// Validation runs before the id is resolved, so a bad payload is reported even for
    /// an unknown id.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: &JsonValue) -> Result<Product, CatalogError> {
        let data = validate_update(input)?;
        let uuid = parse_id(id)?;
        let product = self
            .store
            .update(uuid, data)
            .await
            .map_err(|e| CatalogError::from_store(e, id))?;
        info!("updated product");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let uuid = parse_id(id)?;
        self.store
            .delete(uuid)
            .await
            .map_err(|e| CatalogError::from_store(e, id))?;
        info!("deleted product");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), CatalogError> {
        self.store
            .ping()
            .await
            .map_err(|e| CatalogError::from_store(e, ""))
    }
}

fn parse_id(id: &str) -> Result<Uuid, CatalogError> {
    Uuid::parse_str(id.trim()).map_err(|_| {
        warn!(id, "malformed product id");
        CatalogError::NotFound(id.to_string())
    })
}
