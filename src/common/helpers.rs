// Helper functions for safe logging

/// Masks email addresses for safe logging
///
/// # Example
/// ```
/// let masked = safe_email_log("student@state.edu");
/// // Returns: "s***@state.edu"
/// ```
pub fn safe_email_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***@***.***".to_string(),
    }
}

/// Splits a comma-separated environment value into trimmed, lowercased entries
pub fn parse_csv_lowercase(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("student@state.edu"), "s***@state.edu");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn test_parse_csv_lowercase() {
        let parsed = parse_csv_lowercase(" Admin@Example.com, ,ops@example.com ");
        assert_eq!(parsed, vec!["admin@example.com", "ops@example.com"]);
    }
}
