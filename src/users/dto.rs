use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::accrual::{Milestone, UserRecord, CERTIFICATE_THRESHOLD};
use crate::auth::repo_types::User;

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub school: String,
    pub avatar_url: Option<String>,
    pub points: i64,
    pub badges: Vec<String>,
    pub last_login_date: Option<Date>,
    pub certificate_eligible: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

impl ProfileView {
    pub fn new(user: User, record: &UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            school: user.school,
            avatar_url: user.avatar_url,
            points: record.points(),
            badges: record.badges().to_vec(),
            last_login_date: record.last_login_date(),
            certificate_eligible: record.certificate_eligible(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileView,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub school: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    /// Blank strings mean "leave unchanged".
    pub fn field(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct AwardPointsRequest {
    pub points: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AwardPointsResponse {
    pub points: i64,
    pub badges: Vec<String>,
    pub points_awarded: i64,
    pub new_badges: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct SimulatorActionRequest {
    pub action: String,
    pub points: i64,
}

#[derive(Debug, Deserialize)]
pub struct SpecialAchievementRequest {
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Serialize)]
pub struct SpecialAchievementResponse {
    pub points: i64,
    pub badges: Vec<String>,
    pub points_awarded: i64,
    pub new_badges: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyLoginResponse {
    pub granted: bool,
    pub points: i64,
    pub badges: Vec<String>,
    pub last_login_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse<T> {
    pub leaderboard: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub points: i64,
    pub badges: Vec<String>,
    pub quiz_attempts: i64,
    pub challenges_completed: i64,
    pub rank: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
    pub certificate_eligible: bool,
    pub next_milestone: Option<Milestone>,
    /// e.g. "140 points until Platinum badge"
    pub progress: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct CertificateHolder {
    pub name: String,
    pub school: String,
}

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub eligible: bool,
    pub points: i64,
    pub required_points: i64,
    pub user: CertificateHolder,
}

impl CertificateResponse {
    pub fn new(user: User, record: &UserRecord) -> Self {
        Self {
            eligible: record.certificate_eligible(),
            points: record.points(),
            required_points: CERTIFICATE_THRESHOLD,
            user: CertificateHolder {
                name: user.name,
                school: user.school,
            },
        }
    }
}
