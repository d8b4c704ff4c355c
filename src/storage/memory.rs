//! Process-local product gateway.
//!
//! Holds the same contract as the Postgres gateway: `sku` uniqueness is checked under the
//! write lock, so two racing creates with the same `sku` resolve to one success and one
//! `DuplicateKey`.

use super::{ProductStore, StoreError};
use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Products in insertion order; listing walks the vector backwards.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sku_taken(products: &[Product], sku: &str, except: Option<Uuid>) -> bool {
    products
        .iter()
        .any(|p| p.sku == sku && Some(p.id) != except)
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().rev().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, data: ProductCreateData) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if sku_taken(&products, &data.sku, None) {
            return Err(StoreError::DuplicateKey {
                field: "sku".to_string(),
            });
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            price: data.price,
            sku: data.sku,
            stock: data.stock,
            image_url: data.image_url,
            created_at: now,
            updated_at: now,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, data: ProductUpdateData) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let idx = products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        if let Some(sku) = data.sku.as_deref() {
            if sku_taken(&products, sku, Some(id)) {
                return Err(StoreError::DuplicateKey {
                    field: "sku".to_string(),
                });
            }
        }
        let product = &mut products[idx];
        data.apply_to(product, Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        let idx = products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        products.remove(idx);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
