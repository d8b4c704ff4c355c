//! Postgres-backed product gateway.

use super::{ProductStore, StoreError};
use crate::domain::{Product, ProductCreateData, ProductUpdateData};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, sku, stock, image_url, created_at, updated_at";

/// Gateway over the `products` table. The pool is owned by the caller's process lifetime.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Maps a constraint name to the field it guards.
fn unique_field(constraint: Option<&str>) -> String {
    match constraint {
        Some("products_sku_key") => "sku".to_string(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Turns a unique violation into [`StoreError::DuplicateKey`]; everything else stays opaque.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = unique_field(db_err.constraint());
            warn!(field = %field, "unique constraint violated");
            return StoreError::DuplicateKey { field };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ProductStore for PgProductStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY created_at DESC, id DESC",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    #[instrument(skip(self, data), fields(sku = %data.sku))]
    async fn create(&self, data: ProductCreateData) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO products (id, name, description, price, sku, stock, image_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.price)
            .bind(&data.sku)
            .bind(data.stock)
            .bind(&data.image_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        debug!(id = %product.id, "created product");
        Ok(product)
    }

    #[instrument(skip(self, data))]
    async fn update(&self, id: Uuid, data: ProductUpdateData) -> Result<Product, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = data.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = data.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(price) = data.price {
            set.push("price = ").push_bind_unseparated(price);
        }
        if let Some(sku) = data.sku {
            set.push("sku = ").push_bind_unseparated(sku);
        }
        if let Some(stock) = data.stock {
            set.push("stock = ").push_bind_unseparated(stock);
        }
        if let Some(image_url) = data.image_url {
            set.push("image_url = ").push_bind_unseparated(image_url);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(PRODUCT_COLUMNS);

        let product = qb
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        product.ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
