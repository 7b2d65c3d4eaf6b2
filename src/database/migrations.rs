//! Schema revisions for the farm tables.
//!
//! Revisions form a single linear chain. The applied head is kept in the
//! one-row `farm_api_version` table; every revision runs in its own
//! transaction together with the version bump, so a failed step leaves the
//! schema at the previous revision.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::database::manager::DatabaseError;

/// Revision that precedes the farm table (the empty schema)
pub const BASE_REVISION: &str = "e2412789c190";

const VERSION_TABLE: &str = "farm_api_version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub revision: &'static str,
    pub down_revision: &'static str,
    pub description: &'static str,
    pub upgrade: &'static [&'static str],
    pub downgrade: &'static [&'static str],
}

/// Creates `farm`. The id column is an integer primary key populated from
/// the table's sequence.
pub const ADD_FARMS_TABLE: Migration = Migration {
    revision: "0958f684a41c",
    down_revision: BASE_REVISION,
    description: "Add farms table",
    upgrade: &[r#"
        CREATE TABLE farm (
            name VARCHAR NOT NULL,
            description VARCHAR,
            id SERIAL NOT NULL,
            PRIMARY KEY (id)
        )
    "#],
    downgrade: &["DROP TABLE farm"],
};

pub const ADD_FARM_OWNER: Migration = Migration {
    revision: "3b1f5c2d7a90",
    down_revision: "0958f684a41c",
    description: "Add farm owner",
    upgrade: &["ALTER TABLE farm ADD COLUMN owner_id INTEGER"],
    downgrade: &["ALTER TABLE farm DROP COLUMN owner_id"],
};

/// All revisions, oldest first
pub const MIGRATIONS: &[Migration] = &[ADD_FARMS_TABLE, ADD_FARM_OWNER];

/// Applied and outstanding revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub current: String,
    pub pending: Vec<&'static str>,
}

/// Revisions that come after `current`, in apply order
pub fn pending_after(current: &str) -> Result<Vec<&'static Migration>, DatabaseError> {
    if current == BASE_REVISION {
        return Ok(MIGRATIONS.iter().collect());
    }
    let position = MIGRATIONS
        .iter()
        .position(|m| m.revision == current)
        .ok_or_else(|| DatabaseError::MigrationError(format!("unknown revision {}", current)))?;
    Ok(MIGRATIONS[position + 1..].iter().collect())
}

/// Look up a revision by id
pub fn find(revision: &str) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.revision == revision)
}

pub struct Migrator {
    pool: PgPool,
}

impl Migrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply every outstanding revision. Returns the revisions applied.
    pub async fn upgrade(&self) -> Result<Vec<&'static str>, DatabaseError> {
        self.ensure_version_table().await?;
        let current = self.current_revision().await?;

        let mut applied = Vec::new();
        for migration in pending_after(&current)? {
            let mut tx = self.pool.begin().await?;
            run_statements(&mut tx, migration.upgrade).await?;
            set_version(&mut tx, migration.revision).await?;
            tx.commit().await?;

            info!("Applied migration {} ({})", migration.revision, migration.description);
            applied.push(migration.revision);
        }
        Ok(applied)
    }

    /// Revert the head revision. Returns `None` when already at base.
    pub async fn downgrade(&self) -> Result<Option<&'static str>, DatabaseError> {
        self.ensure_version_table().await?;
        let current = self.current_revision().await?;
        if current == BASE_REVISION {
            return Ok(None);
        }

        let migration = find(&current)
            .ok_or_else(|| DatabaseError::MigrationError(format!("unknown revision {}", current)))?;

        let mut tx = self.pool.begin().await?;
        run_statements(&mut tx, migration.downgrade).await?;
        set_version(&mut tx, migration.down_revision).await?;
        tx.commit().await?;

        info!("Reverted migration {} ({})", migration.revision, migration.description);
        Ok(Some(migration.revision))
    }

    pub async fn status(&self) -> Result<MigrationStatus, DatabaseError> {
        self.ensure_version_table().await?;
        let current = self.current_revision().await?;
        let pending = pending_after(&current)?.iter().map(|m| m.revision).collect();
        Ok(MigrationStatus { current, pending })
    }

    async fn ensure_version_table(&self) -> Result<(), DatabaseError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (version_num VARCHAR(32) NOT NULL PRIMARY KEY)",
            VERSION_TABLE
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn current_revision(&self) -> Result<String, DatabaseError> {
        let sql = format!("SELECT version_num FROM {}", VERSION_TABLE);
        let current: Option<String> = sqlx::query_scalar(&sql).fetch_optional(&self.pool).await?;
        Ok(current.unwrap_or_else(|| BASE_REVISION.to_string()))
    }
}

async fn run_statements(
    tx: &mut Transaction<'static, Postgres>,
    statements: &[&str],
) -> Result<(), DatabaseError> {
    for statement in statements {
        sqlx::query(*statement).execute(&mut **tx).await?;
    }
    Ok(())
}

async fn set_version(tx: &mut Transaction<'static, Postgres>, revision: &str) -> Result<(), DatabaseError> {
    sqlx::query(&format!("DELETE FROM {}", VERSION_TABLE))
        .execute(&mut **tx)
        .await?;
    if revision != BASE_REVISION {
        sqlx::query(&format!("INSERT INTO {} (version_num) VALUES ($1)", VERSION_TABLE))
            .bind(revision)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
