use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::database::manager::DatabaseError;
use crate::database::models::{Farm, FarmCreate};
use crate::database::store::{FarmSession, FarmStore};

#[derive(Debug, Clone)]
struct FarmTable {
    rows: BTreeMap<i32, Farm>,
    next_id: i32,
}

impl Default for FarmTable {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Process-local store for development and tests.
///
/// Sessions hold the table lock for their whole lifetime, so units of work
/// are fully serialized. Changes go to a working copy that only replaces the
/// table on commit.
#[derive(Clone, Default)]
pub struct InMemoryFarmStore {
    table: Arc<Mutex<FarmTable>>,
}

impl InMemoryFarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl FarmStore for InMemoryFarmStore {
    async fn begin(&self) -> Result<Box<dyn FarmSession>, DatabaseError> {
        let guard = self.table.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(InMemoryFarmSession { guard, working }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct InMemoryFarmSession {
    guard: OwnedMutexGuard<FarmTable>,
    working: FarmTable,
}

#[async_trait]
impl FarmSession for InMemoryFarmSession {
    async fn count(&mut self) -> Result<i64, DatabaseError> {
        Ok(self.working.rows.len() as i64)
    }

    async fn select_page(&mut self, skip: i64, limit: i64) -> Result<Vec<Farm>, DatabaseError> {
        let skip = usize::try_from(skip).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.working.rows.values().skip(skip).take(limit).cloned().collect())
    }

    async fn get(&mut self, id: i32) -> Result<Option<Farm>, DatabaseError> {
        Ok(self.working.rows.get(&id).cloned())
    }

    async fn insert(&mut self, farm: &FarmCreate, owner_id: Option<i32>) -> Result<Farm, DatabaseError> {
        let id = self.working.next_id;
        self.working.next_id += 1;

        let row = Farm {
            id,
            name: farm.name.clone(),
            description: farm.description.clone(),
            owner_id,
        };
        self.working.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&mut self, farm: &Farm) -> Result<Farm, DatabaseError> {
        let row = self
            .working
            .rows
            .get_mut(&farm.id)
            .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))?;
        row.name = farm.name.clone();
        row.description = farm.description.clone();
        Ok(row.clone())
    }

    async fn delete(&mut self, id: i32) -> Result<(), DatabaseError> {
        self.working.rows.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let InMemoryFarmSession { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> FarmCreate {
        FarmCreate {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn committed_rows_are_visible() {
        let store = InMemoryFarmStore::new();

        let mut session = store.begin().await.unwrap();
        let farm = session.insert(&create("Hilltop"), Some(3)).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(farm.id, 1);
        let mut session = store.begin().await.unwrap();
        assert_eq!(session.get(1).await.unwrap(), Some(farm));
        assert_eq!(session.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn dropped_session_rolls_back() {
        let store = InMemoryFarmStore::new();

        {
            let mut session = store.begin().await.unwrap();
            session.insert(&create("Ghost"), None).await.unwrap();
        }

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn pages_follow_id_order() {
        let store = InMemoryFarmStore::new();
        let mut session = store.begin().await.unwrap();
        for name in ["a", "b", "c", "d"] {
            session.insert(&create(name), None).await.unwrap();
        }

        let page = session.select_page(1, 2).await.unwrap();
        let names: Vec<_> = page.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);

        assert!(session.select_page(10, 5).await.unwrap().is_empty());
        assert!(session.select_page(0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryFarmStore::new();
        let mut session = store.begin().await.unwrap();
        let first = session.insert(&create("one"), None).await.unwrap();
        session.delete(first.id).await.unwrap();
        let second = session.insert(&create("two"), None).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
