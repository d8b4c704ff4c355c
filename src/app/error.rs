use crate::domain::product::FieldErrors;
use crate::storage::StoreError;
use thiserror::Error;

/// Outcome of a catalog operation that did not succeed.
///
/// `Invalid`, `NotFound` and `DuplicateKey` are expected control flow; only `Unavailable`
/// signals that something actually broke.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid product data: {0}")]
    Invalid(FieldErrors),

    #[error("product not found: {0}")]
    NotFound(String),

    #[error("duplicate value for unique field `{field}`")]
    DuplicateKey { field: String },

    #[error("datastore unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl CatalogError {
    pub(crate) fn from_store(err: StoreError, id: &str) -> Self {
        match err {
            StoreError::NotFound => CatalogError::NotFound(id.to_string()),
            StoreError::DuplicateKey { field } => CatalogError::DuplicateKey { field },
            StoreError::Database(e) => CatalogError::Unavailable(e),
        }
    }
}

impl From<FieldErrors> for CatalogError {
    fn from(errors: FieldErrors) -> Self {
        CatalogError::Invalid(errors)
    }
}
