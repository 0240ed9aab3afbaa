use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{QuestionsResponse, SubmitQuizRequest, SubmitQuizResponse},
    repo,
};
use crate::{
    accrual::Reward,
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::Json,
    state::AppState,
    users::services,
};

pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/quiz/questions", get(list_questions))
        .route("/quiz/submit", post(submit_quiz))
}

#[instrument(skip(state))]
pub async fn list_questions(State(state): State<AppState>) -> AppResult<Json<QuestionsResponse>> {
    let questions = repo::list_active_questions(&state.db).await?;
    Ok(Json(QuestionsResponse { questions }))
}

/// Store the attempt, then award 5 points per correct answer.
#[instrument(skip(state, payload), fields(correct = payload.correct_answers, total = payload.total_questions))]
pub async fn submit_quiz(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubmitQuizRequest>,
) -> AppResult<Json<SubmitQuizResponse>> {
    let reward = Reward::QuizCorrect {
        correct: u32::from(payload.correct_answers),
        total: u32::from(payload.total_questions),
    };
    if payload.total_questions == 0 || !reward.is_within_range() {
        warn!("quiz score out of range");
        return Err(AppError::BadRequest(
            "correct_answers must be between 0 and total_questions".into(),
        ));
    }

    let quiz_id = repo::insert_attempt(
        &state.db,
        user_id,
        &payload.answers,
        i32::from(payload.correct_answers),
        i32::from(payload.total_questions),
    )
    .await?;

    let (record, new_badges) = if payload.correct_answers > 0 {
        services::apply_reward(state.records.as_ref(), user_id, &reward).await?
    } else {
        let versioned = state
            .records
            .load(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        (versioned.record, Vec::new())
    };

    info!(%user_id, %quiz_id, "quiz submitted");
    Ok(Json(SubmitQuizResponse {
        quiz_id,
        correct_answers: payload.correct_answers,
        points_earned: reward.points(),
        points: record.points(),
        badges: record.badges().to_vec(),
        new_badges,
    }))
}
