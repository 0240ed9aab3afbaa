use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Challenge, ChallengeCompletion};

pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<Challenge>> {
    let rows = sqlx::query_as::<_, Challenge>(
        r#"
        SELECT id, title, description, category, created_at
          FROM challenges
         WHERE active
         ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list challenges")?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Challenge>> {
    let row = sqlx::query_as::<_, Challenge>(
        r#"
        SELECT id, title, description, category, created_at
          FROM challenges
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find challenge")?;
    Ok(row)
}

/// Record a completion. `None` when the user already completed it.
pub async fn insert_completion(
    db: &PgPool,
    user_id: Uuid,
    challenge_id: Uuid,
    proof_url: Option<&str>,
    notes: Option<&str>,
) -> anyhow::Result<Option<ChallengeCompletion>> {
    let row = sqlx::query_as::<_, ChallengeCompletion>(
        r#"
        INSERT INTO challenge_completions (user_id, challenge_id, proof_url, notes)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, challenge_id) DO NOTHING
        RETURNING id, user_id, challenge_id, proof_url, notes, completed_at
        "#,
    )
    .bind(user_id)
    .bind(challenge_id)
    .bind(proof_url)
    .bind(notes)
    .fetch_optional(db)
    .await
    .context("insert challenge completion")?;
    Ok(row)
}

/// Undo a completion whose reward could not be saved.
pub async fn delete_completion(db: &PgPool, completion_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM challenge_completions WHERE id = $1"#)
        .bind(completion_id)
        .execute(db)
        .await
        .context("delete challenge completion")?;
    Ok(())
}

pub async fn count_completions(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let (n,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM challenge_completions WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_one(db)
            .await
            .context("count challenge completions")?;
    Ok(n)
}
