use std::fmt;

use serde::Serialize;

use super::badges::{BADGE_THRESHOLDS, CERTIFICATE_THRESHOLD};

/// The next goal a participant is working towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    Badge {
        name: &'static str,
        threshold: i64,
        remaining: i64,
    },
    Certificate {
        threshold: i64,
        remaining: i64,
    },
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Badge {
                name, remaining, ..
            } => write!(f, "{remaining} points until {name} badge"),
            Self::Certificate { remaining, .. } => {
                write!(f, "{remaining} points until certificate eligibility")
            }
        }
    }
}

/// First unreached badge, then the certificate. `None` once both are behind.
pub fn next_milestone(points: i64) -> Option<Milestone> {
    if let Some(t) = BADGE_THRESHOLDS.iter().find(|t| points < t.points) {
        return Some(Milestone::Badge {
            name: t.name,
            threshold: t.points,
            remaining: t.points - points,
        });
    }
    (points < CERTIFICATE_THRESHOLD).then(|| Milestone::Certificate {
        threshold: CERTIFICATE_THRESHOLD,
        remaining: CERTIFICATE_THRESHOLD - points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_badges_then_certificate() {
        assert_eq!(
            next_milestone(0),
            Some(Milestone::Badge {
                name: "Silver",
                threshold: 100,
                remaining: 100
            })
        );
        assert!(matches!(
            next_milestone(100),
            Some(Milestone::Badge { name: "Gold", remaining: 150, .. })
        ));
        assert!(matches!(
            next_milestone(399),
            Some(Milestone::Badge { name: "Platinum", remaining: 1, .. })
        ));
        assert_eq!(
            next_milestone(400),
            Some(Milestone::Certificate {
                threshold: 500,
                remaining: 100
            })
        );
        assert_eq!(next_milestone(500), None);
    }

    #[test]
    fn display_text() {
        let m = next_milestone(260).unwrap();
        assert_eq!(m.to_string(), "140 points until Platinum badge");
        let c = next_milestone(450).unwrap();
        assert_eq!(c.to_string(), "50 points until certificate eligibility");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(next_milestone(450).unwrap()).unwrap();
        assert_eq!(json["kind"], "certificate");
        assert_eq!(json["remaining"], 50);
    }
}
