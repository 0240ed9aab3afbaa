//! Durable storage of [`UserRecord`]s.
//!
//! Saves are compare-and-swap on a version counter, so two concurrent
//! load-mutate-save cycles for the same user cannot silently drop an award.

use async_trait::async_trait;
use uuid::Uuid;

use crate::accrual::UserRecord;

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// A record as loaded, tagged with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub record: UserRecord,
    pub version: i64,
    /// `record` differs from the stored row because loading fixed a broken
    /// invariant. The fix is only persisted by a save.
    pub repaired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Someone else saved since `previous` was loaded; nothing was written.
    Conflict,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> anyhow::Result<Option<Versioned>>;

    /// Write `next` if the stored version still equals `previous.version`.
    ///
    /// History entries past `previous.record.history().len()` are appended in
    /// the same atomic step as the points/badges update.
    async fn save(
        &self,
        user_id: Uuid,
        previous: &Versioned,
        next: &UserRecord,
    ) -> anyhow::Result<SaveOutcome>;
}

/// History entries added since `previous` was loaded.
pub(crate) fn new_history<'a>(
    previous: &Versioned,
    next: &'a UserRecord,
) -> &'a [crate::accrual::AwardEvent] {
    next.history()
        .get(previous.record.history().len()..)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(record: UserRecord) -> Versioned {
        Versioned {
            record,
            version: 3,
            repaired: false,
        }
    }

    #[test]
    fn unchanged_record_has_no_new_history() {
        let mut base = UserRecord::new("eco@example.com");
        base.award_points(5, Some("quiz")).unwrap();
        let previous = loaded(base.clone());
        assert!(new_history(&previous, &base).is_empty());
    }

    #[test]
    fn appended_entries_are_returned_in_order() {
        let mut base = UserRecord::new("eco@example.com");
        base.award_points(5, Some("quiz")).unwrap();
        let previous = loaded(base.clone());

        let mut next = base;
        next.award_points(50, Some("challenge")).unwrap();
        next.award_points(2, Some("login")).unwrap();

        let added: Vec<_> = new_history(&previous, &next)
            .iter()
            .map(|e| (e.reason.as_str(), e.amount))
            .collect();
        assert_eq!(added, vec![("challenge", 50), ("login", 2)]);
    }

    #[test]
    fn empty_base_yields_every_new_entry() {
        let previous = loaded(UserRecord::new("eco@example.com"));
        let mut next = previous.record.clone();
        next.award_points(10, Some("simulator")).unwrap();
        assert_eq!(new_history(&previous, &next).len(), 1);
    }

    #[test]
    fn shorter_next_history_yields_nothing() {
        let mut base = UserRecord::new("eco@example.com");
        base.award_points(5, Some("a")).unwrap();
        base.award_points(5, Some("b")).unwrap();
        let previous = loaded(base);
        let next = UserRecord::new("eco@example.com");
        assert!(new_history(&previous, &next).is_empty());
    }
}
