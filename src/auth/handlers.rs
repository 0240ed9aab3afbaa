use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    accrual::UserRecord,
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::User,
        services::{is_valid_email, normalize_email, MIN_PASSWORD_LEN},
    },
    error::{AppError, AppResult},
    extract::Json,
    state::AppState,
    users::services::{grant_daily_login, today_utc},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = normalize_email(&payload.email);
    let name = payload.name.trim();
    let school = payload.school.trim();

    if payload.email.is_empty() || payload.password.is_empty() || name.is_empty() || school.is_empty() {
        return Err(AppError::BadRequest("All fields are required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest("Password too short".into()));
    }

    // Ensure email is not taken
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.email, &hash, name, school).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(AppError::Conflict("User already exists".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = keys.issue_pair(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let record = UserRecord::new(user.email.clone());
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser::new(user, &record),
            daily_bonus_granted: None,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    User::touch_last_login(&state.db, user.id).await?;
    let (record, granted) = grant_daily_login(state.records.as_ref(), user.id, today_utc()).await?;

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = keys.issue_pair(user.id, &user.email)?;

    info!(user_id = %user.id, daily_bonus = granted, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::new(user, &record),
        daily_bonus_granted: Some(granted),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    let versioned = state
        .records
        .load(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    // Issue new pair
    let (access_token, refresh_token) = keys.issue_pair(user.id, &user.email)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::new(user, &versioned.record),
        daily_bonus_granted: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: "secret-hash".into(),
            name: "Test".into(),
            school: "Green High".into(),
            avatar_url: None,
            created_at: time::OffsetDateTime::now_utc(),
            last_login_at: None,
        };
        let mut record = UserRecord::new("test@example.com");
        record.award_points(120, None).unwrap();

        let json = serde_json::to_value(PublicUser::new(user, &record)).unwrap();
        assert_eq!(json["email"], "test@example.com");
        assert_eq!(json["points"], 120);
        assert_eq!(json["badges"], serde_json::json!(["Silver"]));
        assert!(json.get("password_hash").is_none());
    }
}
