pub mod app;
pub mod client;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CatalogError, CatalogService};
pub use client::{ClientError, ProductClient};
pub use domain::product::{validate_create, validate_update, FieldErrors};
pub use domain::{Product, ProductCreateData, ProductUpdateData};
pub use storage::{InMemoryProductStore, PgProductStore, ProductStore, StoreError};
