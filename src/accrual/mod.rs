//! Accrual engine: points, badges, daily-login bonus and certificate
//! eligibility for a single [`UserRecord`].

pub mod badges;
mod engine;
mod error;
pub mod progress;
mod record;
pub mod rules;

pub use badges::{Badges, BADGE_THRESHOLDS, CERTIFICATE_THRESHOLD};
pub use error::AccrualError;
pub use progress::{next_milestone, Milestone};
pub use record::{AwardEvent, UserRecord};
pub use rules::Reward;
