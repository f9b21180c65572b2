use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Entity, Product, ProductDetails};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{ProductId, RepositoryError, Result, store::ProductRepository};

const SCHEMA: &str = include_str!("../../../migrations/001_create_products_table.sql");

/// PostgreSQL-backed product store.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the products table and its indexes if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let id = ProductId::from_uuid(row.try_get::<Uuid, _>("id")?);
        let name: String = row.try_get("name")?;
        let description: String = row.try_get("description")?;
        let price: Decimal = row.try_get("price")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at")?;

        let details = ProductDetails::new(name, description, price).map_err(|e| {
            RepositoryError::InvalidRow {
                id,
                reason: e.to_string(),
            }
        })?;

        Ok(Product::restore(id, details, created_at, updated_at))
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, skip: u64, take: u64) -> Result<Vec<Product>> {
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(take).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn add(&self, product: Product) -> Result<Product> {
        let id = product.id();
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::AlreadyExists(id);
            }
            RepositoryError::Database(e)
        })?;

        metrics::counter!("product_store_writes_total", "operation" => "add").increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id()))]
    async fn update(&self, product: Product) -> Result<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(product.id()));
        }

        metrics::counter!("product_store_writes_total", "operation" => "update").increment(1);
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        metrics::counter!("product_store_writes_total", "operation" => "delete").increment(1);
        Ok(result.rows_affected() > 0)
    }
}
