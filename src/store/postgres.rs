use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::Date;
use tracing::debug;
use uuid::Uuid;

use super::{new_history, RecordStore, SaveOutcome, Versioned};
use crate::accrual::UserRecord;

/// Records backed by the `users` and `point_transactions` tables.
///
/// `load` leaves the history empty: the audit trail is append-only and
/// `save` inserts only the entries added since the load.
#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    email: String,
    points: i64,
    badges: Vec<String>,
    last_login_date: Option<Date>,
    version: i64,
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>> {
        let Some(row) = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT email, points, badges, last_login_date, version
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("load user record")?
        else {
            return Ok(None);
        };

        let record = UserRecord::restore(
            row.email,
            row.points,
            row.badges.clone(),
            row.last_login_date,
            Vec::new(),
        );
        let repaired = record.points() != row.points || record.badges().to_vec() != row.badges;
        if repaired {
            debug!(%user_id, "stored record repaired on load");
        }

        Ok(Some(Versioned {
            record,
            version: row.version,
            repaired,
        }))
    }

    async fn save(
        &self,
        user_id: Uuid,
        previous: &Versioned,
        next: &UserRecord,
    ) -> anyhow::Result<SaveOutcome> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let updated = sqlx::query(
            r#"
            UPDATE users
               SET points = $3, badges = $4, last_login_date = $5, version = version + 1
             WHERE id = $1 AND version = $2
            "#,
        )
        .bind(user_id)
        .bind(previous.version)
        .bind(next.points())
        .bind(next.badges().to_vec())
        .bind(next.last_login_date())
        .execute(&mut *tx)
        .await
        .context("update user record")?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.context("rollback tx")?;
            debug!(%user_id, version = previous.version, "stale record version");
            return Ok(SaveOutcome::Conflict);
        }

        for event in new_history(previous, next) {
            sqlx::query(
                r#"
                INSERT INTO point_transactions (user_id, reason, amount, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id)
            .bind(&event.reason)
            .bind(event.amount)
            .bind(event.at)
            .execute(&mut *tx)
            .await
            .context("insert point transaction")?;
        }

        tx.commit().await.context("commit tx")?;
        Ok(SaveOutcome::Saved)
    }
}
