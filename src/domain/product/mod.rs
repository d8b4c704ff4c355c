//! The catalog entity and the typed shapes accepted by the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod validation;

pub use validation::{validate_create, validate_update, FieldErrors};

/// A catalog item as persisted and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub sku: String,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitized input for creating a product. Produced by [`validate_create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateData {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub sku: String,
    pub stock: i32,
    /// `None` means "no image"; an empty string in the request maps here too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Sanitized input for a partial update. Produced by [`validate_update`].
///
/// A `None` field is left untouched. `image_url: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
}

impl ProductUpdateData {
    /// True when no recognized field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.sku.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
    }

    /// Applies the supplied fields to `product` and refreshes `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(sku) = &self.sku {
            product.sku = sku.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
        product.updated_at = now;
    }
}

impl From<ProductCreateData> for ProductUpdateData {
    fn from(data: ProductCreateData) -> Self {
        Self {
            name: Some(data.name),
            description: Some(data.description),
            price: Some(data.price),
            sku: Some(data.sku),
            stock: Some(data.stock),
            image_url: data.image_url.map(Some),
        }
    }
}
