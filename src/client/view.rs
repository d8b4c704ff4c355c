//! Client-side catalog state: the product list, the create/edit form, and how both are
//! reconciled with server responses.

use super::{ClientError, ProductClient};
use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use thiserror::Error;
use uuid::Uuid;

/// Local checks run before anything is sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter a valid price.")]
    InvalidPrice,
    #[error("Please enter a valid stock value.")]
    InvalidStock,
    #[error("Name, description and SKU are required.")]
    MissingRequired,
}

/// Form fields exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub sku: String,
    pub stock: String,
    pub image_url: String,
}

impl ProductForm {
    /// Pre-fills the form for edit mode.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            sku: product.sku.clone(),
            stock: product.stock.to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn to_create_data(&self) -> Result<ProductCreateData, FormError> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(FormError::InvalidPrice)?;
        let stock = self
            .stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or(FormError::InvalidStock)?;
        if self.name.trim().is_empty()
            || self.description.trim().is_empty()
            || self.sku.trim().is_empty()
        {
            return Err(FormError::MissingRequired);
        }
        let image_url = Some(self.image_url.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Ok(ProductCreateData {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            sku: self.sku.clone(),
            stock,
            image_url,
        })
    }

    /// Sends every field; an empty image URL is omitted so the stored one is kept.
    pub fn to_update_data(&self) -> Result<ProductUpdateData, FormError> {
        self.to_create_data().map(ProductUpdateData::from)
    }
}

/// Renders a price the way the storefront does (`R$ 1.234,50`).
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Plain-text card for one product.
pub fn render_card(product: &Product) -> String {
    let image = product.image_url.as_deref().unwrap_or("(no image)");
    format!(
        "{name}\n  {description}\n  {price} | SKU: {sku} | Stock: {stock}\n  Image: {image}\n  id: {id}",
        name = product.name,
        description = product.description,
        price = format_price(product.price),
        sku = product.sku,
        stock = product.stock,
        image = image,
        id = product.id,
    )
}

/// List state plus the last errors shown to the user.
#[derive(Debug, Default)]
pub struct CatalogView {
    pub products: Vec<Product>,
    pub load_error: Option<String>,
    pub submit_error: Option<String>,
    pub editing: Option<Product>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list with a fresh server result.
    pub fn load(&mut self, result: Result<Vec<Product>, ClientError>) {
        match result {
            Ok(products) => {
                self.products = products;
                self.load_error = None;
            }
            Err(e) => self.load_error = Some(e.to_string()),
        }
    }

    pub fn apply_created(&mut self, product: Product) {
        self.products.retain(|p| p.id != product.id);
        self.products.insert(0, product);
        self.submit_error = None;
    }

    pub fn apply_updated(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => self.products.insert(0, product),
        }
        self.editing = None;
        self.submit_error = None;
    }

    pub fn apply_removed(&mut self, id: Uuid) {
        self.products.retain(|p| p.id != id);
        if self.editing.as_ref().map(|p| p.id) == Some(id) {
            self.editing = None;
        }
    }

    pub fn find(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Enters edit mode and returns the pre-filled form.
    pub fn begin_edit(&mut self, id: Uuid) -> Option<ProductForm> {
        let product = self.find(id)?.clone();
        let form = ProductForm::from_product(&product);
        self.editing = Some(product);
        Some(form)
    }

    pub async fn refresh(&mut self, client: &ProductClient) {
        let result = client.list_products().await;
        self.load(result);
    }

    /// Validates the form locally, submits it, and folds the result into the list.
    pub async fn submit_create(
        &mut self,
        client: &ProductClient,
        form: &ProductForm,
    ) -> Result<Product, String> {
        let data = form.to_create_data().map_err(|e| self.fail(e.to_string()))?;
        let product = client
            .add_product(&data)
            .await
            .map_err(|e| self.fail(e.to_string()))?;
        self.apply_created(product.clone());
        Ok(product)
    }

    pub async fn submit_update(
        &mut self,
        client: &ProductClient,
        id: Uuid,
        form: &ProductForm,
    ) -> Result<Product, String> {
        let data = form.to_update_data().map_err(|e| self.fail(e.to_string()))?;
        let product = client
            .update_product(&id.to_string(), &data)
            .await
            .map_err(|e| self.fail(e.to_string()))?;
        self.apply_updated(product.clone());
        Ok(product)
    }

    /// A 404 means someone else already removed it, so the local copy goes too.
    pub async fn remove(&mut self, client: &ProductClient, id: Uuid) -> Result<(), String> {
        match client.remove_product(&id.to_string()).await {
            Ok(()) => {
                self.apply_removed(id);
                Ok(())
            }
            Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
                self.apply_removed(id);
                Err(self.fail(e.to_string()))
            }
            Err(e) => Err(self.fail(e.to_string())),
        }
    }

    fn fail(&mut self, message: String) -> String {
        self.submit_error = Some(message.clone());
        message
    }
}
