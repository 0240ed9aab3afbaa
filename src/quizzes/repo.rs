use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::QuizQuestion;

pub async fn list_active_questions(db: &PgPool) -> anyhow::Result<Vec<QuizQuestion>> {
    let rows = sqlx::query_as::<_, QuizQuestion>(
        r#"
        SELECT id, question, options, correct_answer, difficulty, category
          FROM quiz_questions
         WHERE active
         ORDER BY created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list quiz questions")?;
    Ok(rows)
}

pub async fn insert_attempt(
    db: &PgPool,
    user_id: Uuid,
    answers: &serde_json::Value,
    correct_answers: i32,
    total_questions: i32,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO quiz_attempts (user_id, answers, correct_answers, total_questions)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(answers)
    .bind(correct_answers)
    .bind(total_questions)
    .fetch_one(db)
    .await
    .context("insert quiz attempt")?;
    Ok(id)
}

pub async fn count_attempts(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("count quiz attempts")?;
    Ok(n)
}
