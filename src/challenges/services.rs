use std::future::Future;

use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    accrual::{Reward, UserRecord},
    error::AppResult,
    store::RecordStore,
    users::services::apply_reward,
};

/// Award a recorded completion. If the award fails, `undo` removes the
/// completion so the user can retry instead of being told it is done.
pub async fn reward_completion<F, Fut>(
    records: &dyn RecordStore,
    user_id: Uuid,
    reward: &Reward,
    undo: F,
) -> AppResult<(UserRecord, Vec<&'static str>)>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    match apply_reward(records, user_id, reward).await {
        Ok(awarded) => Ok(awarded),
        Err(e) => {
            warn!(%user_id, error = %e, "challenge reward failed; removing completion");
            if let Err(undo_err) = undo().await {
                error!(%user_id, error = %undo_err, "could not remove unrewarded completion");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::{MemoryRecordStore, SaveOutcome, Versioned};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct AlwaysStale(MemoryRecordStore);

    #[async_trait]
    impl RecordStore for AlwaysStale {
        async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>> {
            self.0.load(user_id).await
        }

        async fn save(&self, _: Uuid, _: &Versioned, _: &UserRecord) -> anyhow::Result<SaveOutcome> {
            Ok(SaveOutcome::Conflict)
        }
    }

    fn plant_a_tree() -> Reward {
        Reward::ChallengeCompleted {
            title: "Plant a tree".into(),
        }
    }

    #[tokio::test]
    async fn failed_award_removes_the_completion() {
        let inner = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        inner.insert(id, UserRecord::new("eco@example.com")).await;
        let store = AlwaysStale(inner);
        let undone = AtomicBool::new(false);
        let flag = &undone;

        let err = reward_completion(&store, id, &plant_a_tree(), || async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<(), anyhow::Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(undone.load(Ordering::SeqCst));
        assert_eq!(store.load(id).await.unwrap().unwrap().record.points(), 0);
    }

    #[tokio::test]
    async fn successful_award_keeps_the_completion() {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        store.insert(id, UserRecord::new("eco@example.com")).await;
        let undone = AtomicBool::new(false);
        let flag = &undone;

        let (record, _) = reward_completion(&store, id, &plant_a_tree(), || async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<(), anyhow::Error>(())
        })
        .await
        .unwrap();

        assert_eq!(record.points(), 50);
        assert_eq!(record.history()[0].reason, "Challenge completed: Plant a tree");
        assert!(!undone.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failed_undo_still_reports_the_award_error() {
        let store = MemoryRecordStore::new();
        let err = reward_completion(&store, Uuid::new_v4(), &plant_a_tree(), || async {
            Err::<(), _>(anyhow::anyhow!("database gone"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
