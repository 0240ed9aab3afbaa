//! Load, mutate through the accrual engine, save with retry on conflict.

use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    accrual::{rules::SPECIAL_ACHIEVEMENT_MIN, AccrualError, Reward, UserRecord},
    error::{AppError, AppResult},
    store::{RecordStore, SaveOutcome},
};

const MAX_ATTEMPTS: u32 = 5;

/// Run `op` against the stored record for `user_id` and persist the result.
///
/// A conflicting concurrent save reloads and reapplies `op`. Engine errors
/// abort immediately and nothing is written. An `op` that leaves the record
/// unchanged is not saved unless loading repaired the stored row.
pub async fn accrue<T, F>(
    records: &dyn RecordStore,
    user_id: Uuid,
    mut op: F,
) -> AppResult<(UserRecord, T)>
where
    F: FnMut(&mut UserRecord) -> Result<T, AccrualError> + Send,
    T: Send,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let loaded = records
            .load(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let mut next = loaded.record.clone();
        let out = op(&mut next)?;
        if next == loaded.record && !loaded.repaired {
            return Ok((next, out));
        }

        match records.save(user_id, &loaded, &next).await? {
            SaveOutcome::Saved => {
                debug!(%user_id, identity = next.identity(), points = next.points(), attempt, "record saved");
                return Ok((next, out));
            }
            SaveOutcome::Conflict => {
                warn!(%user_id, attempt, "record changed concurrently; retrying");
            }
        }
    }
    Err(AppError::Conflict(
        "Too many concurrent updates, please retry".into(),
    ))
}

/// Award `amount` points. Returns the saved record and newly unlocked badges.
pub async fn award(
    records: &dyn RecordStore,
    user_id: Uuid,
    amount: i64,
    reason: Option<&str>,
) -> AppResult<(UserRecord, Vec<&'static str>)> {
    let (record, unlocked) =
        accrue(records, user_id, |r| r.award_points(amount, reason)).await?;
    info!(%user_id, amount, points = record.points(), ?unlocked, "points awarded");
    Ok((record, unlocked))
}

pub async fn apply_reward(
    records: &dyn RecordStore,
    user_id: Uuid,
    reward: &Reward,
) -> AppResult<(UserRecord, Vec<&'static str>)> {
    let (record, unlocked) = accrue(records, user_id, |r| r.apply_reward(reward)).await?;
    info!(%user_id, amount = reward.points(), points = record.points(), ?unlocked, "reward applied");
    Ok((record, unlocked))
}

/// Award a major achievement (at least 100 points) together with a badge
/// named after it. Newly added badges come back threshold badges first.
pub async fn award_special_achievement(
    records: &dyn RecordStore,
    user_id: Uuid,
    name: &str,
    points: i64,
) -> AppResult<(UserRecord, Vec<String>)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Achievement name is required".into()));
    }
    let reward = Reward::SpecialAchievement {
        name: name.to_string(),
        points,
    };
    if !reward.is_within_range() {
        return Err(AppError::BadRequest(format!(
            "Special achievements are worth at least {SPECIAL_ACHIEVEMENT_MIN} points"
        )));
    }

    let (record, new_badges) = accrue(records, user_id, |r| {
        let mut added: Vec<String> = r
            .apply_reward(&reward)?
            .into_iter()
            .map(str::to_string)
            .collect();
        if r.grant_special_badge(name) {
            added.push(name.to_string());
        }
        Ok(added)
    })
    .await?;
    info!(%user_id, achievement = name, points, ?new_badges, "special achievement awarded");
    Ok((record, new_badges))
}

/// Idempotent per `today`; safe to call on every authenticated page load.
pub async fn grant_daily_login(
    records: &dyn RecordStore,
    user_id: Uuid,
    today: Date,
) -> AppResult<(UserRecord, bool)> {
    let (record, granted) = accrue(records, user_id, |r| {
        Ok::<_, AccrualError>(r.grant_daily_login_if_eligible(today))
    })
    .await?;
    if granted {
        info!(%user_id, %today, "daily login bonus granted");
    }
    Ok((record, granted))
}

/// Calendar date used for the daily-login bonus. Dates are UTC.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryRecordStore, Versioned};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use time::macros::date;

    async fn store_with_user() -> (MemoryRecordStore, Uuid) {
        let store = MemoryRecordStore::new();
        let id = Uuid::new_v4();
        store.insert(id, UserRecord::new("eco@example.com")).await;
        (store, id)
    }

    #[tokio::test]
    async fn award_persists_points_and_history() {
        let (store, id) = store_with_user().await;
        let (record, unlocked) = award(&store, id, 120, Some("special")).await.unwrap();
        assert_eq!(record.points(), 120);
        assert_eq!(unlocked, vec!["Silver"]);

        let saved = store.load(id).await.unwrap().unwrap();
        assert_eq!(saved.record, record);
        assert_eq!(saved.version, 1);
    }

    #[tokio::test]
    async fn invalid_amount_writes_nothing() {
        let (store, id) = store_with_user().await;
        let err = award(&store, id, 0, Some("nothing")).await.unwrap_err();
        assert!(matches!(err, AppError::Accrual(AccrualError::InvalidAmount(0))));
        assert_eq!(store.load(id).await.unwrap().unwrap().version, 0);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = award(&store, Uuid::new_v4(), 5, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn repeated_daily_login_is_not_saved_twice() {
        let (store, id) = store_with_user().await;
        let day = date!(2024 - 09 - 01);

        let (first, granted) = grant_daily_login(&store, id, day).await.unwrap();
        assert!(granted);
        assert_eq!(first.points(), 2);

        let (second, granted) = grant_daily_login(&store, id, day).await.unwrap();
        assert!(!granted);
        assert_eq!(second, first);
        assert_eq!(store.load(id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn quiz_reward_goes_through_the_table() {
        let (store, id) = store_with_user().await;
        let reward = Reward::QuizCorrect { correct: 4, total: 5 };
        let (record, _) = apply_reward(&store, id, &reward).await.unwrap();
        assert_eq!(record.points(), 20);
        assert_eq!(record.history()[0].reason, "Quiz completion - 4/5 correct");
    }

    #[tokio::test]
    async fn special_achievement_awards_points_and_badge() {
        let (store, id) = store_with_user().await;
        let (record, added) = award_special_achievement(&store, id, " Tree Planter ", 100)
            .await
            .unwrap();
        assert_eq!(record.points(), 100);
        assert_eq!(added, vec!["Silver", "Tree Planter"]);
        assert_eq!(record.history()[0].reason, "Special achievement: Tree Planter");

        let (record, added) = award_special_achievement(&store, id, "Tree Planter", 150)
            .await
            .unwrap();
        assert_eq!(record.points(), 250);
        assert_eq!(added, vec!["Gold"]);
    }

    #[tokio::test]
    async fn small_or_unnamed_achievements_are_rejected() {
        let (store, id) = store_with_user().await;
        for (name, points) in [("Recycler", 99), ("  ", 200)] {
            let err = award_special_achievement(&store, id, name, points)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        assert_eq!(store.load(id).await.unwrap().unwrap().version, 0);
    }

    /// Lets another writer sneak in before the first save.
    struct RacingStore {
        inner: MemoryRecordStore,
        saves: AtomicU32,
    }

    #[async_trait]
    impl RecordStore for RacingStore {
        async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>> {
            self.inner.load(user_id).await
        }

        async fn save(
            &self,
            user_id: Uuid,
            previous: &Versioned,
            next: &UserRecord,
        ) -> anyhow::Result<SaveOutcome> {
            if self.saves.fetch_add(1, Ordering::SeqCst) == 0 {
                let other = self.inner.load(user_id).await?.expect("seeded");
                let mut bumped = other.record.clone();
                bumped.award_points(50, Some("concurrent challenge")).unwrap();
                assert_eq!(self.inner.save(user_id, &other, &bumped).await?, SaveOutcome::Saved);
            }
            self.inner.save(user_id, previous, next).await
        }
    }

    #[tokio::test]
    async fn concurrent_award_is_not_lost() {
        let (inner, id) = store_with_user().await;
        let store = RacingStore {
            inner,
            saves: AtomicU32::new(0),
        };

        let (record, _) = award(&store, id, 5, Some("quiz")).await.unwrap();
        assert_eq!(record.points(), 55);
        assert_eq!(record.history().len(), 2);
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    /// Reports every load as repaired, like a row whose badges lagged its points.
    struct RepairedOnLoad(MemoryRecordStore);

    #[async_trait]
    impl RecordStore for RepairedOnLoad {
        async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>> {
            Ok(self.0.load(user_id).await?.map(|v| Versioned {
                repaired: true,
                ..v
            }))
        }

        async fn save(
            &self,
            user_id: Uuid,
            previous: &Versioned,
            next: &UserRecord,
        ) -> anyhow::Result<SaveOutcome> {
            self.0.save(user_id, previous, next).await
        }
    }

    #[tokio::test]
    async fn repaired_record_is_written_back_by_a_no_op() {
        let (inner, id) = store_with_user().await;
        let store = RepairedOnLoad(inner);
        let day = date!(2024 - 09 - 01);

        grant_daily_login(&store, id, day).await.unwrap();
        let (_, granted) = grant_daily_login(&store, id, day).await.unwrap();
        assert!(!granted);
        assert_eq!(store.load(id).await.unwrap().unwrap().version, 2);
    }

    /// Every save loses the race.
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

    #[tokio::test]
    async fn gives_up_after_repeated_conflicts() {
        let (inner, id) = store_with_user().await;
        let err = award(&AlwaysStale(inner), id, 5, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
