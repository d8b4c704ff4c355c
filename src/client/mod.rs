//! HTTP client for the catalog API.
//!
//! Wraps every endpoint under `/products` and turns non-2xx responses into
//! [`ClientError::Api`], carrying the server's `message` when it sent one.

use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use crate::infra::config;
use crate::transport::http::types::ErrorBody;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

pub mod view;

pub use view::{format_price, CatalogView, FormError, ProductForm};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API base URL is not configured (set CATALOG_API_URL).")]
    MissingBaseUrl,

    #[error("Product id is required.")]
    MissingId,

    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status of an API failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProductClient {
    base_url: String,
    http: reqwest::Client,
}

impl ProductClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:3333/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::MissingBaseUrl);
        }
        Ok(Self { base_url, http })
    }

    /// Builds a client from `CATALOG_API_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = config::api_base_url().map_err(|_| ClientError::MissingBaseUrl)?;
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn product_url(&self, id: &str) -> Result<String, ClientError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ClientError::MissingId);
        }
        Ok(format!("{}/products/{}", self.base_url, id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let result: Result<Vec<Product>, ClientError> = async {
            let response = self.http.get(self.products_url()).send().await?;
            parse_json(response).await
        }
        .await;
        log_failure("list products", &result);
        result
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        let url = self.product_url(id)?;
        let result: Result<Product, ClientError> = async {
            let response = self.http.get(url).send().await?;
            parse_json(response).await
        }
        .await;
        log_failure("fetch product", &result);
        result
    }

    pub async fn add_product(&self, data: &ProductCreateData) -> Result<Product, ClientError> {
        let result: Result<Product, ClientError> = async {
            let response = self.http.post(self.products_url()).json(data).send().await?;
            parse_json(response).await
        }
        .await;
        log_failure("add product", &result);
        result
    }

    pub async fn update_product(
        &self,
        id: &str,
        data: &ProductUpdateData,
    ) -> Result<Product, ClientError> {
        let url = self.product_url(id)?;
        let result: Result<Product, ClientError> = async {
            let response = self.http.put(url).json(data).send().await?;
            parse_json(response).await
        }
        .await;
        log_failure("update product", &result);
        result
    }

    pub async fn remove_product(&self, id: &str) -> Result<(), ClientError> {
        let url = self.product_url(id)?;
        let result: Result<(), ClientError> = async {
            let response = self.http.delete(url).send().await?;
            check_status(response).await.map(|_| ())
        }
        .await;
        log_failure("remove product", &result);
        result
    }
}

fn log_failure<T>(action: &str, result: &Result<T, ClientError>) {
    if let Err(e) = result {
        error!(error = %e, "failed to {}", action);
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}

/// Passes 2xx responses through; anything else becomes [`ClientError::Api`].
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let fallback = format!(
        "API error: {} (Status: {})",
        status.canonical_reason().unwrap_or("Unknown"),
        status.as_u16()
    );
    let (message, errors) = match response.json::<ErrorBody>().await {
        Ok(body) if !body.message.is_empty() => (body.message, body.errors.unwrap_or_default()),
        Ok(body) => (fallback, body.errors.unwrap_or_default()),
        Err(_) => (fallback, BTreeMap::new()),
    };
    Err(ClientError::Api {
        status,
        message,
        errors,
    })
}
