use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::QuizQuestion;

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    #[serde(default)]
    pub answers: serde_json::Value,
    pub correct_answers: u16,
    pub total_questions: u16,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub quiz_id: Uuid,
    pub correct_answers: u16,
    pub points_earned: i64,
    pub points: i64,
    pub badges: Vec<String>,
    pub new_badges: Vec<&'static str>,
}
