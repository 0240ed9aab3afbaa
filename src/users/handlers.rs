use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    accrual::{next_milestone, Reward, UserRecord},
    auth::{repo_types::User, AuthUser},
    challenges, quizzes,
    error::{AppError, AppResult},
    extract::Json,
    state::AppState,
    users::{
        dto::{
            AwardPointsRequest, AwardPointsResponse, CertificateResponse, DailyLoginResponse,
            LeaderboardResponse, ProfileResponse, ProfileView, SimulatorActionRequest,
            SpecialAchievementRequest, SpecialAchievementResponse, StatsResponse,
            UpdateProfileRequest, UserStats,
        },
        repo::{self, LeaderboardEntry},
        services::{self, today_utc},
    },
};

const LEADERBOARD_SIZE: i64 = 50;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/award-points", post(award_points))
        .route("/user/daily-login", post(daily_login))
        .route("/user/special-achievement", post(special_achievement))
        .route("/simulator/action", post(simulator_action))
        .route("/stats/user", get(user_stats))
        .route("/certificate/check", get(certificate_check))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<(User, UserRecord)> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let versioned = state
        .records
        .load(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok((user, versioned.record))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let (user, record) = load_user(&state, user_id).await?;
    Ok(Json(ProfileResponse {
        user: ProfileView::new(user, &record),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let user = repo::update_profile(
        &state.db,
        user_id,
        UpdateProfileRequest::field(&payload.name),
        UpdateProfileRequest::field(&payload.school),
        UpdateProfileRequest::field(&payload.avatar_url),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let versioned = state
        .records
        .load(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(%user_id, "profile updated");
    Ok(Json(ProfileResponse {
        user: ProfileView::new(user, &versioned.record),
    }))
}

#[instrument(skip(state, payload), fields(points = payload.points))]
pub async fn award_points(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AwardPointsRequest>,
) -> AppResult<Json<AwardPointsResponse>> {
    let reason = payload.reason.as_deref().unwrap_or("Points awarded");
    let (record, new_badges) =
        services::award(state.records.as_ref(), user_id, payload.points, Some(reason)).await?;

    Ok(Json(AwardPointsResponse {
        points: record.points(),
        badges: record.badges().to_vec(),
        points_awarded: payload.points,
        new_badges,
    }))
}

#[instrument(skip(state))]
pub async fn daily_login(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<DailyLoginResponse>> {
    let (record, granted) =
        services::grant_daily_login(state.records.as_ref(), user_id, today_utc()).await?;
    Ok(Json(DailyLoginResponse {
        granted,
        points: record.points(),
        badges: record.badges().to_vec(),
        last_login_date: record.last_login_date(),
    }))
}

#[instrument(skip(state, payload), fields(action = %payload.action))]
pub async fn simulator_action(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SimulatorActionRequest>,
) -> AppResult<Json<AwardPointsResponse>> {
    let reward = Reward::SimulatorAction {
        action: payload.action,
        points: payload.points,
    };
    if !reward.is_within_range() {
        warn!(points = payload.points, "simulator award out of range");
        return Err(AppError::BadRequest(
            "Simulator actions are worth 10 to 20 points".into(),
        ));
    }

    let (record, new_badges) =
        services::apply_reward(state.records.as_ref(), user_id, &reward).await?;
    Ok(Json(AwardPointsResponse {
        points: record.points(),
        badges: record.badges().to_vec(),
        points_awarded: reward.points(),
        new_badges,
    }))
}

#[instrument(skip(state, payload), fields(name = %payload.name, points = payload.points))]
pub async fn special_achievement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SpecialAchievementRequest>,
) -> AppResult<Json<SpecialAchievementResponse>> {
    let (record, new_badges) = services::award_special_achievement(
        state.records.as_ref(),
        user_id,
        &payload.name,
        payload.points,
    )
    .await?;
    Ok(Json(SpecialAchievementResponse {
        points: record.points(),
        badges: record.badges().to_vec(),
        points_awarded: payload.points,
        new_badges,
    }))
}

#[instrument(skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> AppResult<Json<LeaderboardResponse<LeaderboardEntry>>> {
    let leaderboard = repo::leaderboard(&state.db, LEADERBOARD_SIZE).await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}

#[instrument(skip(state))]
pub async fn user_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<StatsResponse>> {
    let (user, record) = load_user(&state, user_id).await?;
    let quiz_attempts = quizzes::repo::count_attempts(&state.db, user_id).await?;
    let challenges_completed = challenges::repo::count_completions(&state.db, user_id).await?;
    let rank = repo::rank_for_points(&state.db, record.points()).await?;
    let milestone = next_milestone(record.points());

    Ok(Json(StatsResponse {
        stats: UserStats {
            points: record.points(),
            badges: record.badges().to_vec(),
            quiz_attempts,
            challenges_completed,
            rank,
            member_since: user.created_at,
            certificate_eligible: record.certificate_eligible(),
            next_milestone: milestone,
            progress: milestone.map(|m| m.to_string()),
        },
    }))
}

#[instrument(skip(state))]
pub async fn certificate_check(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<CertificateResponse>> {
    let (user, record) = load_user(&state, user_id).await?;
    Ok(Json(CertificateResponse::new(user, &record)))
}
