use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RecordStore, SaveOutcome, Versioned};
use crate::accrual::UserRecord;

/// In-process store backing the router and service tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<Uuid, Versioned>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly registered record at version 0.
    pub async fn insert(&self, user_id: Uuid, record: UserRecord) {
        self.records
            .lock()
            .await
            .insert(
                user_id,
                Versioned {
                    record,
                    version: 0,
                    repaired: false,
                },
            );
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>> {
        Ok(self.records.lock().await.get(&user_id).cloned())
    }

    async fn save(
        &self,
        user_id: Uuid,
        previous: &Versioned,
        next: &UserRecord,
    ) -> anyhow::Result<SaveOutcome> {
        let mut records = self.records.lock().await;
        let Some(current) = records.get_mut(&user_id) else {
            anyhow::bail!("no record for user {user_id}");
        };
        if current.version != previous.version {
            return Ok(SaveOutcome::Conflict);
        }
        *current = Versioned {
            record: next.clone(),
            version: current.version + 1,
            repaired: false,
        };
        Ok(SaveOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_bumps_version() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        store.insert(id, UserRecord::new("a@example.com")).await;

        let loaded = store.load(id).await.unwrap().unwrap();
        let mut next = loaded.record.clone();
        next.award_points(5, None).unwrap();

        assert_eq!(store.save(id, &loaded, &next).await.unwrap(), SaveOutcome::Saved);
        let reloaded = store.load(id).await.unwrap().unwrap();
        assert_eq!(reloaded.version, 1);
        assert_eq!(reloaded.record.points(), 5);
    }

    #[tokio::test]
    async fn stale_save_is_a_conflict() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        store.insert(id, UserRecord::new("a@example.com")).await;

        let first = store.load(id).await.unwrap().unwrap();
        let second = first.clone();

        let mut a = first.record.clone();
        a.award_points(10, None).unwrap();
        assert_eq!(store.save(id, &first, &a).await.unwrap(), SaveOutcome::Saved);

        let mut b = second.record.clone();
        b.award_points(20, None).unwrap();
        assert_eq!(store.save(id, &second, &b).await.unwrap(), SaveOutcome::Conflict);

        assert_eq!(store.load(id).await.unwrap().unwrap().record.points(), 10);
    }

    #[tokio::test]
    async fn unknown_user_loads_none_and_fails_to_save() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        assert!(store.load(id).await.unwrap().is_none());

        let ghost = Versioned {
            record: UserRecord::new("ghost@example.com"),
            version: 0,
            repaired: false,
        };
        assert!(store.save(id, &ghost, &ghost.record).await.is_err());
    }
}
