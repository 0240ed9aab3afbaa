use serde::{Deserialize, Serialize};

use super::repo_types::{Challenge, ChallengeCompletion};

#[derive(Debug, Serialize)]
pub struct ChallengesResponse {
    pub challenges: Vec<Challenge>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteChallengeRequest {
    pub proof_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompleteChallengeResponse {
    pub completion: ChallengeCompletion,
    pub points_awarded: i64,
    pub points: i64,
    pub badges: Vec<String>,
    pub new_badges: Vec<&'static str>,
}
