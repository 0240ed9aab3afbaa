use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::repo_types::User;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub name: String,
    pub school: String,
    pub points: i64,
    pub badges: Vec<String>,
}

/// Apply the non-empty fields of a profile edit.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    school: Option<&str>,
    avatar_url: Option<&str>,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
           SET name = COALESCE($2, name),
               school = COALESCE($3, school),
               avatar_url = COALESCE($4, avatar_url)
         WHERE id = $1
        RETURNING id, email, password_hash, name, school, avatar_url, created_at, last_login_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(school)
    .bind(avatar_url)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn leaderboard(db: &PgPool, limit: i64) -> anyhow::Result<Vec<LeaderboardEntry>> {
    let rows = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT id, name, school, points, badges
          FROM users
         ORDER BY points DESC, created_at ASC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// 1 + number of users with strictly more points.
pub async fn rank_for_points(db: &PgPool, points: i64) -> anyhow::Result<i64> {
    let (ahead,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users WHERE points > $1"#)
        .bind(points)
        .fetch_one(db)
        .await?;
    Ok(ahead + 1)
}
