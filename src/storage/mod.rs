//! Persistence gateway for catalog products.
//!
//! Every backend reports constraint outcomes through [`StoreError`] variants so callers
//! can branch on them without inspecting error text.

use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryProductStore;
pub use postgres::PgProductStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no product matches the given id")]
    NotFound,

    #[error("duplicate value for unique field `{field}`")]
    DuplicateKey { field: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Contract shared by the Postgres and in-memory gateways.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// `Ok(None)` when no product has this id.
    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Assigns id and timestamps. A taken `sku` yields [`StoreError::DuplicateKey`].
    async fn create(&self, data: ProductCreateData) -> Result<Product, StoreError>;

    /// Changes only the supplied fields and refreshes `updated_at`.
    async fn update(&self, id: Uuid, data: ProductUpdateData) -> Result<Product, StoreError>;

    /// Hard delete. Deleting an absent id yields [`StoreError::NotFound`].
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
