use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Farm, FarmCreate};

const FARM_COLUMNS: &str = "id, name, description, owner_id";

/// Source of units of work. One session is opened per request.
#[async_trait]
pub trait FarmStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn FarmSession>, DatabaseError>;

    /// Liveness probe used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// A single unit of work against the `farm` table.
///
/// Nothing is visible to other sessions until `commit`. Dropping a session
/// without committing discards every change made through it.
#[async_trait]
pub trait FarmSession: Send {
    async fn count(&mut self) -> Result<i64, DatabaseError>;

    /// Rows ordered by id, `skip` rows in, at most `limit` long
    async fn select_page(&mut self, skip: i64, limit: i64) -> Result<Vec<Farm>, DatabaseError>;

    async fn get(&mut self, id: i32) -> Result<Option<Farm>, DatabaseError>;

    /// Insert and return the stored row with its generated id
    async fn insert(&mut self, farm: &FarmCreate, owner_id: Option<i32>) -> Result<Farm, DatabaseError>;

    /// Write back the mutable columns of an existing row and return it as stored
    async fn update(&mut self, farm: &Farm) -> Result<Farm, DatabaseError>;

    async fn delete(&mut self, id: i32) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed store; each session is one database transaction
#[derive(Clone)]
pub struct PgFarmStore {
    pool: PgPool,
}

impl PgFarmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FarmStore for PgFarmStore {
    async fn begin(&self) -> Result<Box<dyn FarmSession>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgFarmSession { tx }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

pub struct PgFarmSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FarmSession for PgFarmSession {
    async fn count(&mut self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM farm")
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn select_page(&mut self, skip: i64, limit: i64) -> Result<Vec<Farm>, DatabaseError> {
        let sql = format!("SELECT {} FROM farm ORDER BY id OFFSET $1 LIMIT $2", FARM_COLUMNS);
        let rows = sqlx::query_as::<_, Farm>(&sql)
            .bind(skip)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Farm>, DatabaseError> {
        let sql = format!("SELECT {} FROM farm WHERE id = $1", FARM_COLUMNS);
        let row = sqlx::query_as::<_, Farm>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn insert(&mut self, farm: &FarmCreate, owner_id: Option<i32>) -> Result<Farm, DatabaseError> {
        let sql = format!(
            "INSERT INTO farm (name, description, owner_id) VALUES ($1, $2, $3) RETURNING {}",
            FARM_COLUMNS
        );
        let row = sqlx::query_as::<_, Farm>(&sql)
            .bind(&farm.name)
            .bind(&farm.description)
            .bind(owner_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn update(&mut self, farm: &Farm) -> Result<Farm, DatabaseError> {
        let sql = format!(
            "UPDATE farm SET name = $2, description = $3 WHERE id = $1 RETURNING {}",
            FARM_COLUMNS
        );
        let row = sqlx::query_as::<_, Farm>(&sql)
            .bind(farm.id)
            .bind(&farm.name)
            .bind(&farm.description)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete(&mut self, id: i32) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM farm WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}
