use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::warn;

use super::badges::Badges;

/// One entry of the audit trail. Never read back by award decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEvent {
    pub reason: String,
    pub amount: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Gamification state of one participant.
///
/// Fields are private: points and badges only move through the operations in
/// [`super::engine`], which keep `points >= 0` and never drop a badge.
/// Deserializing goes through [`UserRecord::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct UserRecord {
    pub(super) identity: String,
    pub(super) points: i64,
    pub(super) badges: Badges,
    pub(super) last_login_date: Option<Date>,
    pub(super) history: Vec<AwardEvent>,
}

/// Wire shape of a [`UserRecord`] before its invariants are checked.
#[derive(Deserialize)]
struct StoredRecord {
    identity: String,
    #[serde(default)]
    points: i64,
    #[serde(default)]
    badges: Badges,
    #[serde(default)]
    last_login_date: Option<Date>,
    #[serde(default)]
    history: Vec<AwardEvent>,
}

impl From<StoredRecord> for UserRecord {
    fn from(r: StoredRecord) -> Self {
        UserRecord::restore(r.identity, r.points, r.badges, r.last_login_date, r.history)
    }
}

impl UserRecord {
    /// Fresh record for a newly registered identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            points: 0,
            badges: Badges::new(),
            last_login_date: None,
            history: Vec::new(),
        }
    }

    /// Rebuild a record from persisted state.
    ///
    /// Negative points are clamped to zero and threshold badges are
    /// recomputed, so a hand-edited row cannot break the invariants.
    pub fn restore(
        identity: impl Into<String>,
        points: i64,
        badges: impl Into<Badges>,
        last_login_date: Option<Date>,
        history: Vec<AwardEvent>,
    ) -> Self {
        let identity = identity.into();
        if points < 0 {
            warn!(%identity, points, "persisted record has negative points; clamping to 0");
        }
        let mut record = Self {
            identity,
            points: points.max(0),
            badges: badges.into(),
            last_login_date,
            history,
        };
        record.recompute_badges();
        record
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn badges(&self) -> &Badges {
        &self.badges
    }

    pub fn last_login_date(&self) -> Option<Date> {
        self.last_login_date
    }

    pub fn history(&self) -> &[AwardEvent] {
        &self.history
    }
}
