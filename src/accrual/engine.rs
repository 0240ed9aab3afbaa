//! Point, badge and certificate state transitions.
//!
//! Everything here is pure: no I/O, no shared state, only the record passed
//! in is touched.

use time::{Date, OffsetDateTime};

use super::{
    badges::{BADGE_THRESHOLDS, CERTIFICATE_THRESHOLD},
    error::AccrualError,
    record::{AwardEvent, UserRecord},
    rules::Reward,
};

impl UserRecord {
    /// Add `amount` points, log `reason` if given, then unlock badges.
    ///
    /// Returns the badges unlocked by this award.
    pub fn award_points(
        &mut self,
        amount: i64,
        reason: Option<&str>,
    ) -> Result<Vec<&'static str>, AccrualError> {
        self.award_points_at(amount, reason, OffsetDateTime::now_utc())
    }

    /// Same as [`award_points`](Self::award_points) with an explicit timestamp.
    pub fn award_points_at(
        &mut self,
        amount: i64,
        reason: Option<&str>,
        at: OffsetDateTime,
    ) -> Result<Vec<&'static str>, AccrualError> {
        if amount <= 0 {
            return Err(AccrualError::InvalidAmount(amount));
        }
        Ok(self.credit(amount, reason, at))
    }

    /// Award a table reward, using its amount and history text.
    pub fn apply_reward(&mut self, reward: &Reward) -> Result<Vec<&'static str>, AccrualError> {
        self.award_points(reward.points(), Some(&reward.reason()))
    }

    fn credit(&mut self, amount: i64, reason: Option<&str>, at: OffsetDateTime) -> Vec<&'static str> {
        // no upper bound; saturate rather than wrap
        self.points = self.points.saturating_add(amount);
        if let Some(reason) = reason {
            self.history.push(AwardEvent {
                reason: reason.to_string(),
                amount,
                at,
            });
        }
        self.recompute_badges()
    }

    /// Ensure every threshold badge at or below `points` is held.
    ///
    /// Idempotent and never removes a badge. Returns the newly added ones.
    pub fn recompute_badges(&mut self) -> Vec<&'static str> {
        BADGE_THRESHOLDS
            .iter()
            .filter(|t| self.points >= t.points)
            .filter(|t| self.badges.insert(t.name))
            .map(|t| t.name)
            .collect()
    }

    /// Grant the daily-login bonus at most once per calendar date.
    pub fn grant_daily_login_if_eligible(&mut self, today: Date) -> bool {
        self.grant_daily_login_at(today, OffsetDateTime::now_utc())
    }

    pub fn grant_daily_login_at(&mut self, today: Date, at: OffsetDateTime) -> bool {
        if self.last_login_date == Some(today) {
            return false;
        }
        let reward = Reward::DailyLogin;
        self.credit(reward.points(), Some(&reward.reason()), at);
        self.last_login_date = Some(today);
        true
    }

    pub fn certificate_eligible(&self) -> bool {
        self.points >= CERTIFICATE_THRESHOLD
    }

    /// Add a badge that is not derived from points. Returns whether it was new.
    pub fn grant_special_badge(&mut self, name: &str) -> bool {
        self.badges.insert(name)
    }
}
