use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ChallengesResponse, CompleteChallengeRequest, CompleteChallengeResponse},
    repo, services,
};
use crate::{
    accrual::Reward,
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::{Json, Path},
    state::AppState,
};

pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/challenges", get(list_challenges))
        .route("/challenges/:id/complete", post(complete_challenge))
}

#[instrument(skip(state))]
pub async fn list_challenges(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> AppResult<Json<ChallengesResponse>> {
    let challenges = repo::list_active(&state.db).await?;
    Ok(Json(ChallengesResponse { challenges }))
}

/// One completion per user and challenge, worth the fixed challenge reward.
#[instrument(skip(state, payload))]
pub async fn complete_challenge(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<CompleteChallengeRequest>>,
) -> AppResult<Json<CompleteChallengeResponse>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let challenge = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))?;

    let Some(completion) = repo::insert_completion(
        &state.db,
        user_id,
        challenge.id,
        payload.proof_url.as_deref(),
        payload.notes.as_deref(),
    )
    .await?
    else {
        warn!(%user_id, challenge_id = %id, "challenge already completed");
        return Err(AppError::Conflict("Challenge already completed".into()));
    };

    let reward = Reward::ChallengeCompleted {
        title: challenge.title,
    };
    let (record, new_badges) =
        services::reward_completion(state.records.as_ref(), user_id, &reward, || {
            repo::delete_completion(&state.db, completion.id)
        })
        .await?;

    info!(%user_id, challenge_id = %id, "challenge completed");
    Ok(Json(CompleteChallengeResponse {
        completion,
        points_awarded: reward.points(),
        points: record.points(),
        badges: record.badges().to_vec(),
        new_badges,
    }))
}
