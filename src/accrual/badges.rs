//! Badge threshold table and the ordered badge set kept on a record.

use serde::{Deserialize, Serialize};

/// A badge unlocked permanently once `points` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeThreshold {
    pub name: &'static str,
    pub points: i64,
}

/// All point-derived badges (must be sorted by points)
pub static BADGE_THRESHOLDS: &[BadgeThreshold] = &[
    BadgeThreshold {
        name: "Silver",
        points: 100,
    },
    BadgeThreshold {
        name: "Gold",
        points: 250,
    },
    BadgeThreshold {
        name: "Platinum",
        points: 400,
    },
];

/// Points needed for certificate eligibility. Not a badge.
pub const CERTIFICATE_THRESHOLD: i64 = 500;

/// Ordered set of badge names. Insertion order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Badges(Vec<String>);

impl Badges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|b| b == name)
    }

    /// Adds `name` if absent. Returns whether it was newly added.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl From<Vec<String>> for Badges {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<Badges> for Vec<String> {
    fn from(badges: Badges) -> Self {
        badges.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for Badges {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut badges = Badges::new();
        for name in iter {
            badges.insert(name.as_ref());
        }
        badges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_sorted_and_below_certificate() {
        let points: Vec<i64> = BADGE_THRESHOLDS.iter().map(|t| t.points).collect();
        let mut sorted = points.clone();
        sorted.sort();
        assert_eq!(points, sorted);
        assert!(points.iter().all(|p| *p < CERTIFICATE_THRESHOLD));
    }

    #[test]
    fn insert_keeps_order_and_uniqueness() {
        let mut badges = Badges::new();
        assert!(badges.insert("Silver"));
        assert!(badges.insert("Eco Pioneer"));
        assert!(!badges.insert("Silver"));
        assert_eq!(badges.to_vec(), vec!["Silver", "Eco Pioneer"]);
    }

    #[test]
    fn from_vec_drops_duplicates() {
        let badges = Badges::from(vec!["Gold".to_string(), "Gold".to_string()]);
        assert_eq!(badges.to_vec(), vec!["Gold"]);
    }

    #[test]
    fn deserializes_from_plain_array() {
        let badges: Badges = serde_json::from_str(r#"["Silver","Silver","Gold"]"#).unwrap();
        assert_eq!(badges.to_vec(), vec!["Silver", "Gold"]);
        assert_eq!(serde_json::to_string(&badges).unwrap(), r#"["Silver","Gold"]"#);
    }
}
