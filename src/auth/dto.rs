use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accrual::UserRecord;
use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub school: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_bonus_granted: Option<bool>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub school: String,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub badges: Vec<String>,
}

impl PublicUser {
    pub fn new(user: User, record: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            school: user.school,
            avatar_url: user.avatar_url,
            points: record.points(),
            badges: record.badges().to_vec(),
        }
    }
}
