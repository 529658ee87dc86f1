// src/utils.rs

/// Key used to match candidates by email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim a free-text field, treating blank input as absent
pub fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Minimal shape check: one '@' with something on both sides and a dot in the domain
pub fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
        assert_eq!(normalize_email("a@b.c"), "a@b.c");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Welder ")), Some("Welder".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("jane@example.com"));
        assert!(!is_plausible_email("jane.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("jane@localhost"));
        assert!(!is_plausible_email("jane@@example.com"));
        assert!(!is_plausible_email("ja ne@example.com"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("ROLE_ADMIN, ROLE_EMPLOYER,,"),
            vec!["ROLE_ADMIN".to_string(), "ROLE_EMPLOYER".to_string()]
        );
        assert!(split_list("").is_empty());
    }
}
