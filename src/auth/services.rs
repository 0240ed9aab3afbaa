use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Record identity for an email: trimmed and lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("greta@school.edu"));
        assert!(is_valid_email("a.b+eco@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "two@@example.com", "space @x.io", "nodot@example"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Greta@School.EDU "), "greta@school.edu");
    }
}
