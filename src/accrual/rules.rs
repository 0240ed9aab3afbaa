//! Fixed reward table.
//!
//! These are the amounts callers pass to the engine. Range checks for the
//! caller-chosen rewards live here too, the engine itself only rejects
//! non-positive amounts.

use std::ops::RangeInclusive;

pub const QUIZ_CORRECT: i64 = 5;
pub const CHALLENGE_COMPLETED: i64 = 50;
pub const DAILY_LOGIN: i64 = 2;
pub const SIMULATOR_ACTION: RangeInclusive<i64> = 10..=20;
pub const SPECIAL_ACHIEVEMENT_MIN: i64 = 100;

/// A rewardable event and the points it is worth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reward {
    QuizCorrect { correct: u32, total: u32 },
    ChallengeCompleted { title: String },
    DailyLogin,
    SimulatorAction { action: String, points: i64 },
    SpecialAchievement { name: String, points: i64 },
}

impl Reward {
    pub fn points(&self) -> i64 {
        match self {
            Self::QuizCorrect { correct, .. } => i64::from(*correct) * QUIZ_CORRECT,
            Self::ChallengeCompleted { .. } => CHALLENGE_COMPLETED,
            Self::DailyLogin => DAILY_LOGIN,
            Self::SimulatorAction { points, .. } => *points,
            Self::SpecialAchievement { points, .. } => *points,
        }
    }

    /// Whether a caller-selected amount falls inside the table's range.
    pub fn is_within_range(&self) -> bool {
        match self {
            Self::QuizCorrect { correct, total } => correct <= total,
            Self::SimulatorAction { points, .. } => SIMULATOR_ACTION.contains(points),
            Self::SpecialAchievement { points, .. } => *points >= SPECIAL_ACHIEVEMENT_MIN,
            Self::ChallengeCompleted { .. } | Self::DailyLogin => true,
        }
    }

    /// History entry text for this reward.
    pub fn reason(&self) -> String {
        match self {
            Self::QuizCorrect { correct, total } => {
                format!("Quiz completion - {correct}/{total} correct")
            }
            Self::ChallengeCompleted { title } => format!("Challenge completed: {title}"),
            Self::DailyLogin => "Daily login bonus".to_string(),
            Self::SimulatorAction { action, .. } => format!("Eco simulator: {action}"),
            Self::SpecialAchievement { name, .. } => format!("Special achievement: {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_reward_scales_with_correct_answers() {
        let r = Reward::QuizCorrect { correct: 7, total: 10 };
        assert_eq!(r.points(), 35);
        assert!(r.is_within_range());
        assert_eq!(r.reason(), "Quiz completion - 7/10 correct");
    }

    #[test]
    fn quiz_with_more_correct_than_total_is_out_of_range() {
        assert!(!Reward::QuizCorrect { correct: 11, total: 10 }.is_within_range());
    }

    #[test]
    fn simulator_range_bounds() {
        let at = |points| Reward::SimulatorAction {
            action: "solar farm".into(),
            points,
        };
        assert!(!at(9).is_within_range());
        assert!(at(10).is_within_range());
        assert!(at(20).is_within_range());
        assert!(!at(21).is_within_range());
    }

    #[test]
    fn special_achievement_has_a_floor() {
        let special = |points| Reward::SpecialAchievement {
            name: "Tree Hugger".into(),
            points,
        };
        assert!(!special(99).is_within_range());
        assert!(special(100).is_within_range());
        assert!(special(1_000).is_within_range());
    }

    #[test]
    fn fixed_rewards() {
        assert_eq!(Reward::DailyLogin.points(), DAILY_LOGIN);
        assert_eq!(
            Reward::ChallengeCompleted { title: "x".into() }.points(),
            CHALLENGE_COMPLETED
        );
    }
}
